//! Stage registry: from a stage name to a fresh stage instance.
//!
//! The engine only ever goes through [`StageRegistry`]; embedders provide
//! their own implementation to expose their stage families.
//! [`FactoryRegistry`] is the provided map-backed implementation, and
//! [`builtin`] serves the stage set that ships with the binary.

use crate::errors::{PipelineError, Result};
use crate::stage::Stage;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Loader contract: produce a fresh stage for a registry key.
pub trait StageRegistry: Send + Sync {
    /// Instantiate a stage. Unknown names are a fatal registry error.
    fn create(&self, name: &str) -> Result<Box<dyn Stage>>;

    /// Registered names, for listings and diagnostics.
    fn names(&self) -> Vec<&str>;
}

/// Factory producing one stage instance.
pub type StageFactory = Box<dyn Fn() -> Box<dyn Stage> + Send + Sync>;

/// Map-backed registry of stage factories.
#[derive(Default)]
pub struct FactoryRegistry {
    factories: BTreeMap<String, StageFactory>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a stage name, replacing any previous one.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn Stage> + Send + Sync + 'static,
    ) {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Builder-style registration.
    pub fn with(
        mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn Stage> + Send + Sync + 'static,
    ) -> Self {
        self.register(name, factory);
        self
    }
}

impl StageRegistry for FactoryRegistry {
    fn create(&self, name: &str) -> Result<Box<dyn Stage>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| PipelineError::UnknownStage(name.to_string()))
    }

    fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

static BUILTIN: Lazy<FactoryRegistry> = Lazy::new(|| {
    FactoryRegistry::new()
        .with("textreader", crate::stages::TextReader::boxed)
        .with("linefilter", crate::stages::LineFilter::boxed)
        .with("textwriter", crate::stages::TextWriter::boxed)
        .with("printer", crate::stages::Printer::boxed)
});

/// The stage set that ships with the standalone binary.
pub fn builtin() -> &'static FactoryRegistry {
    &BUILTIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::MemberEntry;
    use crate::value::Value;

    struct Noop;

    impl Stage for Noop {
        fn input_members(&self) -> Vec<MemberEntry> {
            Vec::new()
        }
        fn output_members(&self) -> Vec<MemberEntry> {
            Vec::new()
        }
        fn parse_arguments(&mut self, _args: &[String]) -> Result<()> {
            Ok(())
        }
        fn get_member(&self, _name: &str) -> Option<Value> {
            None
        }
        fn set_member(&mut self, _name: &str, _value: Value) -> Result<()> {
            Ok(())
        }
        fn clear_member(&mut self, _name: &str) {}
        fn run(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_create_known_and_unknown() {
        let registry = FactoryRegistry::new().with("noop", || Box::new(Noop));
        assert!(registry.create("noop").is_ok());
        let err = registry.create("ghost").unwrap_err();
        assert!(matches!(err, PipelineError::UnknownStage(name) if name == "ghost"));
    }

    #[test]
    fn test_names_sorted() {
        let registry = FactoryRegistry::new()
            .with("zeta", || Box::new(Noop))
            .with("alpha", || Box::new(Noop));
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_builtin_contains_text_family() {
        let names = builtin().names();
        for name in ["textreader", "linefilter", "textwriter", "printer"] {
            assert!(names.contains(&name), "missing builtin {name}");
        }
    }
}
