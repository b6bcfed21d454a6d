//! Registry - name → raw scaffold config.
//!
//! The registry stores *raw* configs only. Resolution is never cached here;
//! every lookup may be re-resolved into a fresh canonical scaffold.

use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::{
    application::{ApplicationError, EventBus},
    domain::{DomainError, DomainValidator as validator, RawScaffoldConfig},
    error::ScaffaResult,
};

/// Thread-safe store of raw scaffold configs, in registration order.
pub struct Registry {
    inner: RwLock<IndexMap<String, RawScaffoldConfig>>,
    events: Arc<EventBus>,
}

impl Registry {
    /// Create an empty registry that announces registrations on `events`.
    pub fn new(events: Arc<EventBus>) -> Self {
        Self {
            inner: RwLock::new(IndexMap::new()),
            events,
        }
    }

    /// Store `config` under `name`, replacing any previous entry.
    ///
    /// Mapping-like configs (plain and canonical) get `name` stamped onto
    /// them before they are stored. Emits `scaffold-registered`.
    #[instrument(skip(self, config), fields(kind = config.kind()))]
    pub fn set(&self, name: &str, mut config: RawScaffoldConfig) -> ScaffaResult<()> {
        validator::validate_scaffold_name(name)?;
        config.stamp_name(name);

        let replaced = {
            let mut inner = self
                .inner
                .write()
                .map_err(|_| ApplicationError::StoreLockError)?;
            inner.insert(name.to_string(), config.clone()).is_some()
        };

        if replaced {
            debug!(scaffold = name, "Replaced registered scaffold");
        }
        self.events.registered(name, &config);
        Ok(())
    }

    /// Look up the raw config registered under `name`.
    pub fn get(&self, name: &str) -> ScaffaResult<RawScaffoldConfig> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner.get(name).cloned().ok_or_else(|| {
            DomainError::ScaffoldNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner
            .read()
            .map(|inner| inner.contains_key(name))
            .unwrap_or(false)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> ScaffaResult<Vec<String>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.keys().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::{Event, EventLog};
    use crate::domain::{PlainConfig, Scaffold, TargetDefinition};
    use crate::error::ScaffaError;

    fn registry() -> (Registry, Arc<EventLog>) {
        let events = Arc::new(EventBus::new());
        let log = Arc::new(EventLog::new());
        events.subscribe(log.clone());
        (Registry::new(events), log)
    }

    #[test]
    fn set_stamps_name_on_plain_configs() {
        let (registry, _) = registry();
        let config = PlainConfig::new().target("foo", TargetDefinition::empty());
        registry.set("abc", config.into()).unwrap();

        let stored = registry.get("abc").unwrap();
        assert_eq!(stored.name(), Some("abc"));
    }

    #[test]
    fn set_stamps_name_on_canonical_configs() {
        let (registry, _) = registry();
        registry
            .set("abc", Scaffold::new(Default::default()).into())
            .unwrap();
        assert_eq!(registry.get("abc").unwrap().name(), Some("abc"));
    }

    #[test]
    fn set_rejects_blank_names() {
        let (registry, log) = registry();
        let err = registry.set("", PlainConfig::new().into()).unwrap_err();
        assert!(matches!(
            err,
            ScaffaError::Domain(DomainError::InvalidArgument { .. })
        ));
        assert!(log.events().is_empty());
    }

    #[test]
    fn get_unknown_is_not_found() {
        let (registry, _) = registry();
        assert!(matches!(
            registry.get("missing"),
            Err(ScaffaError::Domain(DomainError::ScaffoldNotFound { .. }))
        ));
    }

    #[test]
    fn last_write_wins() {
        let (registry, _) = registry();
        registry
            .set("abc", PlainConfig::new().target("one", TargetDefinition::empty()).into())
            .unwrap();
        registry
            .set("abc", PlainConfig::new().target("two", TargetDefinition::empty()).into())
            .unwrap();

        let RawScaffoldConfig::Plain(stored) = registry.get("abc").unwrap() else {
            panic!("expected a plain config");
        };
        assert_eq!(stored.targets.keys().collect::<Vec<_>>(), vec!["two"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn set_emits_registered() {
        let (registry, log) = registry();
        registry.set("abc", PlainConfig::new().into()).unwrap();
        assert_eq!(
            log.events(),
            vec![Event::Registered { name: "abc".into() }]
        );
    }

    #[test]
    fn names_keep_registration_order() {
        let (registry, _) = registry();
        for name in ["zeta", "alpha", "mid"] {
            registry.set(name, PlainConfig::new().into()).unwrap();
        }
        assert_eq!(registry.names().unwrap(), vec!["zeta", "alpha", "mid"]);
        assert!(registry.contains("alpha"));
    }
}
