//! Implementation of the `scaffa list` command.

use serde_json::json;

use scaffa_core::domain::Options;

use crate::{
    cli::{GlobalArgs, ListArgs, ListFormat},
    commands::Workspace,
    config::AppConfig,
    error::CliResult,
    output::Reporter,
};

pub fn execute(
    args: ListArgs,
    global: GlobalArgs,
    config: AppConfig,
    reporter: Reporter,
) -> CliResult<()> {
    let workspace = Workspace::open(&global, &config, None)?;

    // Tasks are projected on resolution.
    let names: Vec<String> = match &args.scaffold {
        Some(name) => vec![name.clone()],
        None => workspace.scaffold_names().map(str::to_string).collect(),
    };
    for name in &names {
        workspace.app.resolve(name.as_str(), &Options::new())?;
    }

    let format = if reporter.is_json() {
        ListFormat::Json
    } else {
        args.format
    };

    match format {
        ListFormat::Table => {
            reporter.heading("Tasks:")?;
            for name in &names {
                for task in workspace.tasks.tasks_for(name) {
                    let line = if task.dependencies.is_empty() {
                        format!("  {name}:{}", task.name)
                    } else {
                        format!("  {name}:{}  <- {}", task.name, task.dependencies.join(", "))
                    };
                    reporter.plain(&line)?;
                }
            }
        }
        ListFormat::List => {
            for name in &names {
                for task in workspace.tasks.tasks_for(name) {
                    reporter.plain(&format!("{name}:{}", task.name))?;
                }
            }
        }
        ListFormat::Json => {
            let tasks: Vec<_> = names
                .iter()
                .flat_map(|name| {
                    workspace.tasks.tasks_for(name).into_iter().map(move |task| {
                        json!({
                            "scaffold": name,
                            "name": task.name,
                            "dependencies": task.dependencies,
                        })
                    })
                })
                .collect();
            reporter.json(&json!(tasks))?;
        }
    }

    Ok(())
}
