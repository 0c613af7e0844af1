//! Main Variable: ordered (gradient, thermodynamic force) pairs
//! (spec.md §3, §4.3 `@Gradient`/`@ThermodynamicForce`/`@Flux`).

#[derive(Debug, Clone)]
pub struct Gradient {
    pub variable_name: String,
    /// If true, the increment `Δg` is stored; otherwise the two endpoint
    /// values `g0`, `g1` are stored (spec.md §3, "Main Variable").
    pub increment_known: bool,
}

#[derive(Debug, Clone)]
pub struct ThermodynamicForce {
    pub variable_name: String,
}

#[derive(Debug, Clone)]
pub struct MainVariable {
    pub gradient: Gradient,
    pub force: ThermodynamicForce,
}

/// Accumulates unpaired gradients/forces and pops a pair as soon as both
/// sides have at least one entry (spec.md §4.3, testable property 4:
/// `|gradients_unpaired| x |forces_unpaired| = 0`).
#[derive(Debug, Clone, Default)]
pub struct MainVariableBuilder {
    pending_gradients: Vec<Gradient>,
    pending_forces: Vec<ThermodynamicForce>,
    pub pairs: Vec<MainVariable>,
}

impl MainVariableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_gradient(&mut self, gradient: Gradient) {
        self.pending_gradients.push(gradient);
        self.try_pair();
    }

    pub fn push_force(&mut self, force: ThermodynamicForce) {
        self.pending_forces.push(force);
        self.try_pair();
    }

    fn try_pair(&mut self) {
        while !self.pending_gradients.is_empty() && !self.pending_forces.is_empty() {
            let gradient = self.pending_gradients.remove(0);
            let force = self.pending_forces.remove(0);
            self.pairs.push(MainVariable { gradient, force });
        }
    }

    pub fn unpaired_count(&self) -> usize {
        self.pending_gradients.len() * self.pending_forces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairing_happens_as_soon_as_both_sides_nonempty() {
        let mut b = MainVariableBuilder::new();
        b.push_gradient(Gradient { variable_name: "eto".into(), increment_known: true });
        assert_eq!(b.pairs.len(), 0);
        b.push_force(ThermodynamicForce { variable_name: "sig".into() });
        assert_eq!(b.pairs.len(), 1);
        assert_eq!(b.unpaired_count(), 0);
    }

    #[test]
    fn unpaired_invariant_holds_after_every_push() {
        let mut b = MainVariableBuilder::new();
        b.push_gradient(Gradient { variable_name: "eto".into(), increment_known: true });
        b.push_gradient(Gradient { variable_name: "F".into(), increment_known: false });
        assert_eq!(b.unpaired_count(), 0, "no forces yet, product with 0 forces is 0");
        b.push_force(ThermodynamicForce { variable_name: "sig".into() });
        assert_eq!(b.unpaired_count(), 0);
        assert_eq!(b.pairs.len(), 1);
    }

    #[test]
    fn ordering_is_fifo() {
        let mut b = MainVariableBuilder::new();
        b.push_gradient(Gradient { variable_name: "g1".into(), increment_known: true });
        b.push_gradient(Gradient { variable_name: "g2".into(), increment_known: true });
        b.push_force(ThermodynamicForce { variable_name: "f1".into() });
        b.push_force(ThermodynamicForce { variable_name: "f2".into() });
        assert_eq!(b.pairs[0].gradient.variable_name, "g1");
        assert_eq!(b.pairs[0].force.variable_name, "f1");
        assert_eq!(b.pairs[1].gradient.variable_name, "g2");
        assert_eq!(b.pairs[1].force.variable_name, "f2");
    }
}
