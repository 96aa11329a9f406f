//! Weighted combination of strategy modules into one decision per bar.

use std::fmt::Write as _;

use super::strategy::{ActionKind, EvaluationContext, StrategyKind, StrategyParams, TradeAction};

/// Share of the weighted vote (in percent) a side must exceed to act.
pub const DECISION_THRESHOLD: f64 = 50.0;

/// One strategy module together with its weight and parameter map.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyBinding {
    pub kind: StrategyKind,
    pub weight: f64,
    pub params: StrategyParams,
}

impl StrategyBinding {
    /// Binding with the module's default parameters.
    pub fn new(kind: StrategyKind, weight: f64) -> Self {
        StrategyBinding {
            kind,
            weight,
            params: kind.default_params(),
        }
    }

    pub fn with_params(mut self, params: StrategyParams) -> Self {
        self.params = params;
        self
    }

    fn evaluate(&self, ctx: &EvaluationContext) -> TradeAction {
        self.kind.evaluate(&ctx.with_params(&self.params))
    }
}

/// Decide the action for the current bar.
///
/// A single binding is passed straight through whatever its weight. With
/// several bindings each BUY or SELL contributes `weight * amount / 100` to its
/// side; both sides are normalised by the total weight and a side wins only if
/// it beats the other and exceeds [`DECISION_THRESHOLD`]. The winning score
/// becomes the trade amount.
pub fn aggregate(bindings: &[StrategyBinding], ctx: &EvaluationContext) -> TradeAction {
    match bindings {
        [] => TradeAction::hold_because("No strategies configured"),
        [single] => single.evaluate(ctx),
        _ => weighted_vote(bindings, ctx),
    }
}

fn weighted_vote(bindings: &[StrategyBinding], ctx: &EvaluationContext) -> TradeAction {
    let mut buy_score = 0.0;
    let mut sell_score = 0.0;
    let mut total_weight = 0.0;
    let mut votes = Vec::with_capacity(bindings.len());

    for binding in bindings {
        let action = binding.evaluate(ctx);
        total_weight += binding.weight;
        match action.kind {
            ActionKind::Buy => buy_score += binding.weight * action.amount / 100.0,
            ActionKind::Sell => sell_score += binding.weight * action.amount / 100.0,
            ActionKind::Hold => {}
        }
        votes.push(format!(
            "{}: {} ({}%)",
            binding.kind.name(),
            action.kind,
            binding.weight
        ));
    }

    let summary = votes.join(", ");

    if total_weight <= 0.0 {
        return TradeAction::hold_because(format!("No strong signal: {}", summary));
    }

    let buy_score = buy_score / total_weight * 100.0;
    let sell_score = sell_score / total_weight * 100.0;

    if buy_score > sell_score && buy_score > DECISION_THRESHOLD {
        TradeAction::buy(buy_score, format!("Combined signal: {}", summary))
    } else if sell_score > buy_score && sell_score > DECISION_THRESHOLD {
        TradeAction::sell(sell_score, format!("Combined signal: {}", summary))
    } else {
        TradeAction::hold_because(format!("No strong signal: {}", summary))
    }
}

/// Display name for a run: the module name for a single binding, otherwise
/// `Combined: A (w%), B (w%)`.
pub fn strategy_name(bindings: &[StrategyBinding]) -> String {
    match bindings {
        [single] => single.kind.name().to_string(),
        _ => {
            let mut name = String::from("Combined: ");
            for (i, b) in bindings.iter().enumerate() {
                if i > 0 {
                    name.push_str(", ");
                }
                let _ = write!(name, "{} ({}%)", b.kind.name(), b.weight);
            }
            name
        }
    }
}

/// An editable list of bindings whose weights are kept summing to 100.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingSet {
    bindings: Vec<StrategyBinding>,
}

impl BindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bindings(&self) -> &[StrategyBinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.bindings.iter().map(|b| b.weight).sum()
    }

    /// Append a module with default parameters and split weight equally.
    pub fn add(&mut self, kind: StrategyKind) {
        self.bindings.push(StrategyBinding::new(kind, 0.0));
        self.equalize();
    }

    /// Append a pre-built binding and split weight equally.
    pub fn add_binding(&mut self, binding: StrategyBinding) {
        self.bindings.push(binding);
        self.equalize();
    }

    /// Remove the binding at `index`; the remainder share weight equally.
    pub fn remove(&mut self, index: usize) -> Option<StrategyBinding> {
        if index >= self.bindings.len() {
            return None;
        }
        let removed = self.bindings.remove(index);
        self.equalize();
        Some(removed)
    }

    /// Change one weight, then rescale all weights proportionally to 100.
    /// Left as-is when every weight is zero.
    pub fn set_weight(&mut self, index: usize, weight: f64) -> bool {
        let Some(binding) = self.bindings.get_mut(index) else {
            return false;
        };
        binding.weight = weight.max(0.0);
        self.normalize();
        true
    }

    pub fn normalize(&mut self) {
        let total = self.total_weight();
        if total > 0.0 {
            for b in &mut self.bindings {
                b.weight = b.weight / total * 100.0;
            }
        }
    }

    fn equalize(&mut self) {
        if self.bindings.is_empty() {
            return;
        }
        let equal = 100.0 / self.bindings.len() as f64;
        for b in &mut self.bindings {
            b.weight = equal;
        }
    }

    pub fn into_bindings(self) -> Vec<StrategyBinding> {
        self.bindings
    }
}

impl From<Vec<StrategyBinding>> for BindingSet {
    fn from(bindings: Vec<StrategyBinding>) -> Self {
        BindingSet { bindings }
    }
}
