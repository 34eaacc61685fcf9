use std::collections::BTreeSet;

use thiserror::Error;

use crate::data::model::Dataset;

use super::chart::ChartSpec;
use super::derive::Controls;
use super::layout::{ControlId, GraphId};

/// A chart derivation: pure function of dataset and control values.
pub type Derivation = Box<dyn Fn(&Dataset, &Controls) -> ChartSpec>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("graph {0} already has a registered derivation")]
    DuplicateOutput(GraphId),
    #[error("derivation for graph {0} declares no inputs")]
    NoInputs(GraphId),
}

/// One subscription: which graph it writes and which controls it reads.
pub struct Binding {
    pub output: GraphId,
    pub inputs: BTreeSet<ControlId>,
    derive: Derivation,
}

impl Binding {
    pub fn depends_on(&self, control: ControlId) -> bool {
        self.inputs.contains(&control)
    }

    pub fn evaluate(&self, dataset: &Dataset, controls: &Controls) -> ChartSpec {
        (self.derive)(dataset, controls)
    }
}

/// Observer registry mapping control changes to the derivations that read
/// them. Bindings are evaluated in registration order.
#[derive(Default)]
pub struct Registry {
    bindings: Vec<Binding>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `derive` to `inputs`, writing its result to `output`.
    /// Each graph has at most one writer.
    pub fn register(
        &mut self,
        output: GraphId,
        inputs: impl IntoIterator<Item = ControlId>,
        derive: impl Fn(&Dataset, &Controls) -> ChartSpec + 'static,
    ) -> Result<&mut Self, RegistryError> {
        if self.bindings.iter().any(|b| b.output == output) {
            return Err(RegistryError::DuplicateOutput(output));
        }
        let inputs: BTreeSet<ControlId> = inputs.into_iter().collect();
        if inputs.is_empty() {
            return Err(RegistryError::NoInputs(output));
        }
        log::debug!("Registered {output} <- {inputs:?}");
        self.bindings.push(Binding {
            output,
            inputs,
            derive: Box::new(derive),
        });
        Ok(self)
    }

    /// Graphs that must be recomputed when `changed` changes.
    pub fn dependents(&self, changed: ControlId) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().filter(move |b| b.depends_on(changed))
    }

    /// Re-evaluate exactly the bindings that read `changed`.
    pub fn dispatch(
        &self,
        changed: ControlId,
        dataset: &Dataset,
        controls: &Controls,
    ) -> Vec<(GraphId, ChartSpec)> {
        self.dependents(changed)
            .map(|b| {
                log::debug!("{changed} changed, recomputing {}", b.output);
                (b.output, b.evaluate(dataset, controls))
            })
            .collect()
    }

    /// Evaluate every binding, used for the initial render.
    pub fn evaluate_all(&self, dataset: &Dataset, controls: &Controls) -> Vec<(GraphId, ChartSpec)> {
        self.bindings
            .iter()
            .map(|b| (b.output, b.evaluate(dataset, controls)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::data::filter::{PayloadRange, SiteSelector};

    fn controls() -> Controls {
        Controls {
            site: SiteSelector::All,
            payload: PayloadRange::new(0.0, 10000.0),
        }
    }

    fn counting(counter: &Rc<Cell<u32>>, title: &'static str) -> impl Fn(&Dataset, &Controls) -> ChartSpec {
        let counter = Rc::clone(counter);
        move |_, _| {
            counter.set(counter.get() + 1);
            ChartSpec::pie(title, Vec::new())
        }
    }

    #[test]
    fn dispatch_runs_only_dependent_derivations() {
        let pie_runs = Rc::new(Cell::new(0));
        let scatter_runs = Rc::new(Cell::new(0));
        let mut registry = Registry::new();
        registry
            .register(GraphId::SuccessPieChart, [ControlId::SiteDropdown], counting(&pie_runs, "pie"))
            .unwrap()
            .register(
                GraphId::SuccessPayloadScatterChart,
                [ControlId::SiteDropdown, ControlId::PayloadSlider],
                counting(&scatter_runs, "scatter"),
            )
            .unwrap();

        let ds = Dataset::from_records(Vec::new());
        let updated = registry.dispatch(ControlId::PayloadSlider, &ds, &controls());
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].0, GraphId::SuccessPayloadScatterChart);
        assert_eq!((pie_runs.get(), scatter_runs.get()), (0, 1));

        let updated = registry.dispatch(ControlId::SiteDropdown, &ds, &controls());
        let graphs: Vec<GraphId> = updated.iter().map(|(g, _)| *g).collect();
        assert_eq!(graphs, [GraphId::SuccessPieChart, GraphId::SuccessPayloadScatterChart]);
        assert_eq!((pie_runs.get(), scatter_runs.get()), (1, 2));
    }

    #[test]
    fn evaluate_all_runs_every_binding_once() {
        let runs = Rc::new(Cell::new(0));
        let mut registry = Registry::new();
        registry
            .register(GraphId::SuccessPieChart, [ControlId::SiteDropdown], counting(&runs, "a"))
            .unwrap()
            .register(GraphId::SuccessPayloadScatterChart, [ControlId::PayloadSlider], counting(&runs, "b"))
            .unwrap();

        let out = registry.evaluate_all(&Dataset::from_records(Vec::new()), &controls());
        assert_eq!(out.len(), 2);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn second_writer_for_a_graph_is_rejected() {
        let runs = Rc::new(Cell::new(0));
        let mut registry = Registry::new();
        registry
            .register(GraphId::SuccessPieChart, [ControlId::SiteDropdown], counting(&runs, "a"))
            .unwrap();
        let err = registry
            .register(GraphId::SuccessPieChart, [ControlId::PayloadSlider], counting(&runs, "b"))
            .err();
        assert_eq!(err, Some(RegistryError::DuplicateOutput(GraphId::SuccessPieChart)));
        let ds = Dataset::from_records(Vec::new());
        assert_eq!(registry.evaluate_all(&ds, &controls()).len(), 1);
    }

    #[test]
    fn binding_without_inputs_is_rejected() {
        let runs = Rc::new(Cell::new(0));
        let err = Registry::new()
            .register(GraphId::SuccessPieChart, [], counting(&runs, "a"))
            .err();
        assert_eq!(err, Some(RegistryError::NoInputs(GraphId::SuccessPieChart)));
    }
}
