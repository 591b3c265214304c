//! Fluent configuration of a reusable aligner.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cost::{Cost, CostFunction};
use crate::engine::{AlignmentResult, SearchEngine};
use crate::error::AlignError;
use crate::heuristic::{LabelDeficitOracle, ZeroOracle};
use crate::product::{build_synchronous_product, ProcessModel, SynchronousProduct};
use crate::traits::HeuristicOracle;
use crate::variant::{Direction, ExecutionVariant};

/// Creates the oracle for one search direction over one product.
///
/// Every alignment gets fresh oracles, so stateful oracles never leak
/// between traces.
pub type OracleFactory = Arc<
    dyn Fn(&SynchronousProduct, Direction) -> Result<Box<dyn HeuristicOracle>, AlignError>
        + Send
        + Sync,
>;

/// Serializable subset of the aligner configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignerConfig {
    #[serde(default)]
    pub variant: ExecutionVariant,
    #[serde(default)]
    pub expansion_limit: Option<usize>,
    /// Replaces the log/model move cost of the standard table.
    #[serde(default)]
    pub unit_cost: Option<Cost>,
}

#[derive(Clone, Default)]
pub struct AlignerBuilder {
    variant: ExecutionVariant,
    costs: CostFunction,
    expansion_limit: Option<usize>,
    oracle_factory: Option<OracleFactory>,
}

impl AlignerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AlignerConfig) -> Self {
        let mut builder = Self::new().with_variant(config.variant);
        if let Some(limit) = config.expansion_limit {
            builder = builder.with_expansion_limit(limit);
        }
        if let Some(unit) = config.unit_cost {
            builder = builder.with_costs(CostFunction::with_unit(unit));
        }
        builder
    }

    pub fn with_variant(mut self, variant: ExecutionVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_costs(mut self, costs: CostFunction) -> Self {
        self.costs = costs;
        self
    }

    pub fn with_expansion_limit(mut self, limit: usize) -> Self {
        self.expansion_limit = Some(limit);
        self
    }

    /// Oracles for informed variants. Without a factory, products built from
    /// a trace get [`LabelDeficitOracle`] in both directions and other
    /// products [`ZeroOracle`].
    pub fn with_oracle_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&SynchronousProduct, Direction) -> Result<Box<dyn HeuristicOracle>, AlignError>
            + Send
            + Sync
            + 'static,
    {
        self.oracle_factory = Some(Arc::new(factory));
        self
    }

    pub fn build(self) -> Aligner {
        Aligner {
            variant: self.variant,
            costs: self.costs,
            expansion_limit: self.expansion_limit,
            oracle_factory: self.oracle_factory,
        }
    }
}

/// Aligns traces against process models under a fixed configuration.
///
/// ```
/// use spn_align::{AlignerBuilder, ExecutionVariant, MoveKind, ProcessModel};
///
/// let aligner = AlignerBuilder::new()
///     .with_variant(ExecutionVariant::a_star())
///     .build();
/// let model = ProcessModel::sequence(&["a", "b"]);
/// let result = aligner.align(&["a", "c"], &model)?;
/// assert_eq!(result.cost, 20);
/// assert_eq!(result.count(MoveKind::Log), 1);
/// # Ok::<(), spn_align::AlignError>(())
/// ```
#[derive(Clone)]
pub struct Aligner {
    variant: ExecutionVariant,
    costs: CostFunction,
    expansion_limit: Option<usize>,
    oracle_factory: Option<OracleFactory>,
}

impl Aligner {
    pub fn variant(&self) -> ExecutionVariant {
        self.variant
    }

    pub fn costs(&self) -> &CostFunction {
        &self.costs
    }

    pub fn expansion_limit(&self) -> Option<usize> {
        self.expansion_limit
    }

    /// The priced synchronous product of `trace` and `model`.
    pub fn product<S: AsRef<str>>(
        &self,
        trace: &[S],
        model: &ProcessModel,
    ) -> Result<SynchronousProduct, AlignError> {
        build_synchronous_product(trace, model, &self.costs)
    }

    /// Cheapest alignment of `trace` against `model`.
    pub fn align<S: AsRef<str>>(
        &self,
        trace: &[S],
        model: &ProcessModel,
    ) -> Result<AlignmentResult, AlignError> {
        let product = self.product(trace, model)?;
        self.align_product(&product)
    }

    /// Cheapest firing sequence of an already built product.
    pub fn align_product(&self, product: &SynchronousProduct) -> Result<AlignmentResult, AlignError> {
        let mut engine = SearchEngine::new(product, self.variant);
        if let Some(limit) = self.expansion_limit {
            engine = engine.with_expansion_limit(limit);
        }
        if !self.variant.is_informed() {
            return engine.run();
        }
        let forward = self.oracle(product, Direction::Forward)?;
        let backward = if self.variant.is_bidirectional() {
            Some(self.oracle(product, Direction::Backward)?)
        } else {
            None
        };
        engine = engine.with_oracle(forward.as_ref());
        if let Some(backward) = backward.as_deref() {
            engine = engine.with_backward_oracle(backward);
        }
        engine.run()
    }

    fn oracle(
        &self,
        product: &SynchronousProduct,
        direction: Direction,
    ) -> Result<Box<dyn HeuristicOracle>, AlignError> {
        if let Some(factory) = &self.oracle_factory {
            return factory(product, direction);
        }
        if product.trace_layout().is_some() {
            Ok(Box::new(LabelDeficitOracle::new(product, direction)?))
        } else {
            Ok(Box::new(ZeroOracle))
        }
    }
}

impl Default for Aligner {
    fn default() -> Self {
        AlignerBuilder::new().build()
    }
}

impl fmt::Debug for Aligner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aligner")
            .field("variant", &self.variant)
            .field("costs", &self.costs)
            .field("expansion_limit", &self.expansion_limit)
            .field("custom_oracles", &self.oracle_factory.is_some())
            .finish()
    }
}
