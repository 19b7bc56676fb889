//! Transition-rule extension point.
//!
//! Rules fire every `birth_death_interval` ticks and may spawn, despawn or
//! convert agents through [`World`]'s mutation methods, which keep the grid,
//! registry and counters consistent. No rules are registered by default.

use crate::params::SimulationParameters;
use crate::world::World;
use rand::RngCore;

/// A population transition (births, deaths, category conversions).
pub trait TransitionRule: Send {
    /// Returns the name of this rule.
    fn name(&self) -> &str;

    /// Applies the rule to the world.
    fn apply(&mut self, world: &mut World, params: &SimulationParameters, rng: &mut dyn RngCore);
}

/// Ordered collection of transition rules.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn TransitionRule>>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule; rules fire in registration order.
    pub fn register(&mut self, rule: impl TransitionRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in firing order.
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Fires every rule once.
    pub fn apply_all(&mut self, world: &mut World, params: &SimulationParameters, rng: &mut dyn RngCore) {
        for rule in &mut self.rules {
            rule.apply(world, params, rng);
            tracing::debug!(rule = rule.name(), agents = world.agent_count(), "transition rule fired");
        }
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet").field("rules", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Label;

    struct Convert;

    impl TransitionRule for Convert {
        fn name(&self) -> &str {
            "convert_first"
        }

        fn apply(&mut self, world: &mut World, _params: &SimulationParameters, _rng: &mut dyn RngCore) {
            if world.agent_count() > 0 {
                world.convert(0, Label::Machine).unwrap();
            }
        }
    }

    #[test]
    fn test_empty_by_default() {
        let rules = RuleSet::new();
        assert!(rules.is_empty());
        assert_eq!(format!("{:?}", rules), "RuleSet { rules: [] }");
    }

    #[test]
    fn test_apply_all_runs_rules() {
        let mut world = World::empty(3);
        world.spawn(0, 0, Label::Human, 1.0).unwrap();

        let mut rules = RuleSet::new();
        rules.register(Convert);
        assert_eq!(rules.names(), vec!["convert_first"]);

        let mut rng = rand::rngs::mock::StepRng::new(0, 1);
        rules.apply_all(&mut world, &SimulationParameters::default(), &mut rng);

        assert_eq!(world.population().machines, 1);
        assert_eq!(world.population().humans, 0);
        world.check_consistency().unwrap();
    }
}
