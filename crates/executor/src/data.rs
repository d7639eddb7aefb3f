use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
};

/// Application data made available to resolvers through
/// [`ResolverContext::data`](crate::ResolverContext::data), keyed by type.
#[derive(Default)]
pub struct Data(HashMap<TypeId, Box<dyn Any + Sync + Send>>);

impl Data {
    pub fn insert<D: Any + Send + Sync>(&mut self, data: D) {
        self.0.insert(TypeId::of::<D>(), Box::new(data));
    }

    pub fn get<D: Any + Send + Sync>(&self) -> Option<&D> {
        self.0.get(&TypeId::of::<D>()).and_then(|data| data.downcast_ref::<D>())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Data").field(&self.0.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_one_value_per_type() {
        let mut data = Data::default();
        data.insert(42_u32);
        data.insert(String::from("first"));
        data.insert(String::from("second"));

        assert_eq!(data.get::<u32>(), Some(&42));
        assert_eq!(data.get::<String>().map(String::as_str), Some("second"));
        assert_eq!(data.get::<u64>(), None);
    }
}
