//! Target interface registration and hand-off (spec.md §1, "Out of scope...
//! Target interfaces... the core exposes registration, enumeration, and a
//! hand-off hook").

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::BehaviourDescription;
use crate::error::Result;

/// A named plug-in that emits solver-specific glue from a completed
/// [`BehaviourDescription`]. The core never executes an interface itself;
/// it only hands the finished description off.
pub trait Interface {
    fn name(&self) -> &str;

    /// The single hand-off hook: called once per interface with the fully
    /// lowered description (spec.md §1).
    fn hand_off(&self, _description: &BehaviourDescription) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InterfaceRegistry {
    instances: Vec<Rc<dyn Interface>>,
    by_name: HashMap<String, usize>,
}

impl InterfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, interface: Rc<dyn Interface>) {
        let idx = self.instances.len();
        self.by_name.insert(interface.name().to_string(), idx);
        self.instances.push(interface);
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Interface>> {
        self.by_name.get(name).map(|&i| self.instances[i].clone())
    }

    pub fn names(&self) -> Vec<&str> {
        self.instances.iter().map(|i| i.name()).collect()
    }

    /// Hands the description off to every registered interface.
    pub fn hand_off_all(&self, description: &BehaviourDescription) -> Result<()> {
        for interface in &self.instances {
            interface.hand_off(description)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;
    impl Interface for Noop {
        fn name(&self) -> &str {
            "generic"
        }
    }

    #[test]
    fn registered_interface_enumerates_by_name() {
        let mut reg = InterfaceRegistry::new();
        reg.register(Rc::new(Noop));
        assert_eq!(reg.names(), vec!["generic"]);
        assert!(reg.get("generic").is_some());
    }

    #[test]
    fn hand_off_runs_every_registered_interface() {
        let mut reg = InterfaceRegistry::new();
        reg.register(Rc::new(Noop));
        let desc = BehaviourDescription::new("Test");
        reg.hand_off_all(&desc).unwrap();
    }
}
