//! Fan-in of per-target file streams.
//!
//! [`MergedStream`] polls every source it holds and yields items in whatever
//! order producers make them ready. It keeps a count of unfinished sources and
//! ends only when that count reaches zero. On the way out it fires
//! [`CompletionSignal::Finish`] and then [`CompletionSignal::End`], once each,
//! so listeners waiting on either convention see termination.
//!
//! A source that yields an `Err` has that error passed through once and is
//! then retired. Its siblings keep running.

use std::{
    fmt,
    pin::Pin,
    task::{Context, Poll},
};

use futures::stream::{FusedStream, Stream};

use crate::{application::ports::FileStream, domain::FileItem, error::ScaffaResult};

/// Termination notifications fired by a [`MergedStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionSignal {
    Finish,
    End,
}

type CompletionListener = Box<dyn FnMut(CompletionSignal) + Send>;

/// Merged output of any number of file streams.
#[derive(Default)]
pub struct MergedStream {
    sources: Vec<Option<FileStream>>,
    remaining: usize,
    cursor: usize,
    listeners: Vec<CompletionListener>,
    completed: bool,
}

impl MergedStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source. Sources added after completion are ignored.
    pub fn add(&mut self, source: FileStream) {
        if self.completed {
            return;
        }
        self.sources.push(Some(source));
        self.remaining += 1;
    }

    /// Call `listener` with each completion signal.
    pub fn on_completion(&mut self, listener: impl FnMut(CompletionSignal) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Number of sources still producing.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    fn retire(&mut self, index: usize) {
        if self.sources[index].take().is_some() {
            self.remaining -= 1;
        }
    }

    fn complete(&mut self) {
        if self.completed {
            return;
        }
        self.completed = true;
        for signal in [CompletionSignal::Finish, CompletionSignal::End] {
            for listener in &mut self.listeners {
                listener(signal);
            }
        }
    }
}

impl Stream for MergedStream {
    type Item = ScaffaResult<FileItem>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.completed {
            return Poll::Ready(None);
        }

        let len = this.sources.len();
        // Start after the last source that produced, so a busy source
        // cannot starve the rest.
        for offset in 0..len {
            let index = (this.cursor + offset) % len;
            let Some(source) = this.sources[index].as_mut() else {
                continue;
            };

            match source.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(item))) => {
                    this.cursor = (index + 1) % len;
                    return Poll::Ready(Some(Ok(item)));
                }
                Poll::Ready(Some(Err(err))) => {
                    this.retire(index);
                    this.cursor = (index + 1) % len;
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => this.retire(index),
                Poll::Pending => {}
            }
        }

        if this.remaining == 0 {
            this.complete();
            Poll::Ready(None)
        } else {
            Poll::Pending
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.completed { (0, Some(0)) } else { (0, None) }
    }
}

impl FusedStream for MergedStream {
    fn is_terminated(&self) -> bool {
        self.completed
    }
}

impl fmt::Debug for MergedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergedStream")
            .field("sources", &self.sources.len())
            .field("remaining", &self.remaining)
            .field("completed", &self.completed)
            .finish()
    }
}
