//! Brick registration and lifecycle hooks (spec.md §1, "Out of scope...
//! Bricks... the core exposes registration and three lifecycle hooks").
//!
//! Concrete bricks (pre-packaged behaviour fragments such as plasticity
//! blocks) are external collaborators; this module only exposes the seam
//! they plug into. The registry is process-wide and immutable after
//! initialisation (spec.md §5, "Shared resources").

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::BehaviourDescription;
use crate::error::Result;

/// A pre-packaged behaviour fragment. The Behaviour Description holds
/// bricks by name (spec.md §3, "Ownership": "Bricks and interfaces are
/// shared: the Behaviour Description holds weak references by name; the
/// registry owns the instances").
pub trait Brick {
    fn name(&self) -> &str;

    /// Runs once, at the end of parsing, before the emitter's
    /// defaults-fixing step (spec.md §5, "bricks' `completeVariableDeclaration`
    /// runs before the emitter's defaults-fixing").
    fn complete_variable_declaration(&self, _description: &mut BehaviourDescription) -> Result<()> {
        Ok(())
    }

    /// Runs once, at the very end of `endsInputFileProcessing`.
    fn end_treatment(&self, _description: &mut BehaviourDescription) -> Result<()> {
        Ok(())
    }

    /// The keyword-extension lifecycle point: a brick may claim keywords
    /// outside the closed core set (spec.md §9, "Dynamic handler dispatch").
    /// Returns `true` if `keyword` was handled.
    fn handles_keyword(&self, _keyword: &str) -> bool {
        false
    }
}

#[derive(Default)]
pub struct BrickRegistry {
    instances: Vec<Rc<dyn Brick>>,
    by_name: HashMap<String, usize>,
}

impl BrickRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, brick: Rc<dyn Brick>) {
        let idx = self.instances.len();
        self.by_name.insert(brick.name().to_string(), idx);
        self.instances.push(brick);
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Brick>> {
        self.by_name.get(name).map(|&i| self.instances[i].clone())
    }

    pub fn names(&self) -> Vec<&str> {
        self.instances.iter().map(|b| b.name()).collect()
    }

    pub fn run_complete_variable_declaration(&self, description: &mut BehaviourDescription) -> Result<()> {
        for brick in &self.instances {
            brick.complete_variable_declaration(description)?;
        }
        Ok(())
    }

    pub fn run_end_treatment(&self, description: &mut BehaviourDescription) -> Result<()> {
        for brick in &self.instances {
            brick.end_treatment(description)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;
    impl Brick for Noop {
        fn name(&self) -> &str {
            "Noop"
        }
    }

    #[test]
    fn registered_brick_is_retrievable_by_name() {
        let mut reg = BrickRegistry::new();
        reg.register(Rc::new(Noop));
        assert!(reg.get("Noop").is_some());
        assert!(reg.get("Other").is_none());
    }

    #[test]
    fn lifecycle_hooks_run_without_error_for_a_noop_brick() {
        let mut reg = BrickRegistry::new();
        reg.register(Rc::new(Noop));
        let mut desc = BehaviourDescription::new("Test");
        reg.run_complete_variable_declaration(&mut desc).unwrap();
        reg.run_end_treatment(&mut desc).unwrap();
    }

    #[test]
    fn names_lists_every_registered_brick() {
        let mut reg = BrickRegistry::new();
        reg.register(Rc::new(Noop));
        assert_eq!(reg.names(), vec!["Noop"]);
    }
}
