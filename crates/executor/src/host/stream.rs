use std::{
    marker::PhantomData,
    sync::{Arc, Mutex},
};

use futures::stream::BoxStream;
use futures_util::{Stream, StreamExt};

use super::{HostValue, IntoHostValue};
use crate::ResolverError;

/// The return type of a subscription field resolver: a stream of events, each
/// of which is either a payload or an error.
pub struct EventStream<T> {
    inner: BoxStream<'static, Result<HostValue, ResolverError>>,
    _item: PhantomData<fn() -> T>,
}

impl<T: IntoHostValue> EventStream<T> {
    pub fn new(stream: impl Stream<Item = Result<T, ResolverError>> + Send + 'static) -> Self {
        EventStream {
            inner: stream.map(|event| event.map(IntoHostValue::into_host_value)).boxed(),
            _item: PhantomData,
        }
    }

    pub fn into_source(self) -> EventSource {
        EventSource {
            stream: Arc::new(Mutex::new(Some(self.inner))),
        }
    }
}

/// Type-erased event stream held by a [`HostValue::Stream`]. It can be
/// consumed exactly once.
#[derive(Clone)]
pub struct EventSource {
    stream: Arc<Mutex<Option<BoxStream<'static, Result<HostValue, ResolverError>>>>>,
}

impl EventSource {
    pub fn take(&self) -> Option<EventReceiver> {
        let mut guard = self.stream.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.take().map(|stream| EventReceiver { stream })
    }
}

pub struct EventReceiver {
    stream: BoxStream<'static, Result<HostValue, ResolverError>>,
}

/// What the event source delivered.
pub enum Event {
    Next(Result<HostValue, ResolverError>),
    Closed,
}

impl EventReceiver {
    pub async fn next(&mut self) -> Event {
        match self.stream.next().await {
            Some(event) => Event::Next(event),
            None => Event::Closed,
        }
    }
}
