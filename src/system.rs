use crate::engine::{InputState, Surface};
use anyhow::Result;

/// A pluggable slice of game logic the loop manager drives every frame.
/// Lower `priority` runs first.
pub trait GameSystem {
    fn name(&self) -> &str;
    fn priority(&self) -> i32;
    fn enabled(&self) -> bool {
        true
    }
    fn init(&mut self) -> Result<()> {
        Ok(())
    }
    fn update(&mut self, delta_ms: f64, input: &InputState) -> Result<()>;
    fn render(&mut self, _surface: &mut dyn Surface) -> Result<()> {
        Ok(())
    }
    fn destroy(&mut self) {}
}

/// A system that failed during a frame, the frame itself carries on
#[derive(Debug)]
pub struct SystemFault {
    pub system: String,
    pub error: anyhow::Error,
}

/// Systems in ascending priority order, registration order breaks ties
#[derive(Default)]
pub struct SystemRegistry {
    systems: Vec<Box<dyn GameSystem>>,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Runs `init` and inserts the system. A system that fails `init` is
    /// dropped and the error returned.
    pub fn register(&mut self, mut system: Box<dyn GameSystem>) -> Result<()> {
        system.init()?;
        self.insert(system);
        Ok(())
    }

    /// Inserts an already initialised system
    pub fn insert(&mut self, system: Box<dyn GameSystem>) {
        // insert after every system with priority <= ours, keeps ties stable
        let index = self
            .systems
            .partition_point(|existing| existing.priority() <= system.priority());
        self.systems.insert(index, system);
    }

    /// Moves every system of `other` in, keeping priority order
    pub fn absorb(&mut self, other: SystemRegistry) {
        for system in other.systems {
            self.insert(system);
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.systems.iter().map(|system| system.name()).collect()
    }

    pub fn update_all(&mut self, delta_ms: f64, input: &InputState) -> Vec<SystemFault> {
        self.systems
            .iter_mut()
            .filter(|system| system.enabled())
            .filter_map(|system| {
                system.update(delta_ms, input).err().map(|error| SystemFault {
                    system: system.name().to_owned(),
                    error,
                })
            })
            .collect()
    }

    pub fn render_all(&mut self, surface: &mut dyn Surface) -> Vec<SystemFault> {
        let mut faults = Vec::new();
        for system in self.systems.iter_mut().filter(|system| system.enabled()) {
            if let Err(error) = system.render(surface) {
                faults.push(SystemFault {
                    system: system.name().to_owned(),
                    error,
                });
            }
        }
        faults
    }

    /// Tears systems down highest priority first and empties the registry
    pub fn destroy_all(&mut self) {
        while let Some(mut system) = self.systems.pop() {
            system.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Journal = Rc<RefCell<Vec<String>>>;

    struct Tracked {
        name: &'static str,
        priority: i32,
        enabled: bool,
        fail_init: bool,
        fail_update: bool,
        journal: Journal,
    }

    impl Tracked {
        fn new(name: &'static str, priority: i32, journal: &Journal) -> Self {
            Tracked {
                name,
                priority,
                enabled: true,
                fail_init: false,
                fail_update: false,
                journal: journal.clone(),
            }
        }

        fn record(&self, what: &str) {
            self.journal.borrow_mut().push(format!("{}:{}", self.name, what));
        }
    }

    impl GameSystem for Tracked {
        fn name(&self) -> &str {
            self.name
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn enabled(&self) -> bool {
            self.enabled
        }
        fn init(&mut self) -> Result<()> {
            if self.fail_init {
                return Err(anyhow!("init failed"));
            }
            self.record("init");
            Ok(())
        }
        fn update(&mut self, _delta_ms: f64, _input: &InputState) -> Result<()> {
            self.record("update");
            if self.fail_update {
                return Err(anyhow!("update failed"));
            }
            Ok(())
        }
        fn destroy(&mut self) {
            self.record("destroy");
        }
    }

    #[test]
    fn systems_run_in_priority_order_with_stable_ties() {
        let journal = Journal::default();
        let mut registry = SystemRegistry::new();
        registry.register(Box::new(Tracked::new("render", 20, &journal))).unwrap();
        registry.register(Box::new(Tracked::new("physics", 10, &journal))).unwrap();
        registry.register(Box::new(Tracked::new("audio", 20, &journal))).unwrap();

        assert_eq!(registry.names(), vec!["physics", "render", "audio"]);

        journal.borrow_mut().clear();
        registry.update_all(16.0, &InputState::default());
        assert_eq!(
            *journal.borrow(),
            vec!["physics:update", "render:update", "audio:update"]
        );
    }

    #[test]
    fn failed_init_is_not_registered() {
        let journal = Journal::default();
        let mut registry = SystemRegistry::new();
        let mut tracked = Tracked::new("broken", 0, &journal);
        tracked.fail_init = true;

        assert!(registry.register(Box::new(tracked)).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn a_failing_system_does_not_stop_the_rest() {
        let journal = Journal::default();
        let mut registry = SystemRegistry::new();
        let mut broken = Tracked::new("broken", 0, &journal);
        broken.fail_update = true;
        registry.register(Box::new(broken)).unwrap();
        registry.register(Box::new(Tracked::new("healthy", 1, &journal))).unwrap();

        let faults = registry.update_all(16.0, &InputState::default());

        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].system, "broken");
        assert!(journal.borrow().contains(&"healthy:update".to_string()));
    }

    #[test]
    fn disabled_systems_are_skipped() {
        let journal = Journal::default();
        let mut registry = SystemRegistry::new();
        let mut idle = Tracked::new("idle", 0, &journal);
        idle.enabled = false;
        registry.register(Box::new(idle)).unwrap();

        journal.borrow_mut().clear();
        registry.update_all(16.0, &InputState::default());
        assert!(journal.borrow().is_empty());
    }

    #[test]
    fn absorb_merges_by_priority_without_init() {
        let journal = Journal::default();
        let mut registry = SystemRegistry::new();
        registry.register(Box::new(Tracked::new("low", 1, &journal))).unwrap();
        registry.register(Box::new(Tracked::new("high", 30, &journal))).unwrap();

        let mut late = SystemRegistry::new();
        late.insert(Box::new(Tracked::new("middle", 20, &journal)));
        journal.borrow_mut().clear();
        registry.absorb(late);

        assert_eq!(registry.names(), vec!["low", "middle", "high"]);
        assert!(journal.borrow().is_empty());
    }

    #[test]
    fn destroy_runs_in_reverse_priority_and_empties() {
        let journal = Journal::default();
        let mut registry = SystemRegistry::new();
        registry.register(Box::new(Tracked::new("first", 1, &journal))).unwrap();
        registry.register(Box::new(Tracked::new("second", 2, &journal))).unwrap();

        journal.borrow_mut().clear();
        registry.destroy_all();

        assert_eq!(*journal.borrow(), vec!["second:destroy", "first:destroy"]);
        assert!(registry.is_empty());
    }
}
