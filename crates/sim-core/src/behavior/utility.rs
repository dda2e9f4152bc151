//! Utility Selection
//!
//! Scores every registered consideration against the agent's state and
//! blackboard, dispatches to the best subtree above the threshold, and falls
//! back to the default behavior otherwise. Scores are unbounded floats;
//! "floors" force a consideration above all ordinary competitors.

use serde_json::{json, Map, Value};
use sim_events::EventType;

use super::query;
use super::{ActionKind, Condition, Node, NodeStatus, TickContext};
use crate::error::DecisionError;

/// A candidate behavior and the function that rates its desirability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Consideration {
    Flee,
    DefendTerritory,
    Attack,
    HelpAlly,
    Eat,
    Rest,
    Group,
    SeekResource,
    Invade,
    Reproduce,
    Build,
}

impl Consideration {
    pub fn name(&self) -> &'static str {
        match self {
            Consideration::Flee => "flee",
            Consideration::DefendTerritory => "defend_territory",
            Consideration::Attack => "attack",
            Consideration::HelpAlly => "help_ally",
            Consideration::Eat => "eat",
            Consideration::Rest => "rest",
            Consideration::Group => "group",
            Consideration::SeekResource => "seek_resource",
            Consideration::Invade => "invade",
            Consideration::Reproduce => "reproduce",
            Consideration::Build => "build",
        }
    }

    pub fn score(&self, ctx: &TickContext<'_>) -> f64 {
        let score = match self {
            Consideration::Flee => flee_score(ctx),
            Consideration::DefendTerritory => defend_score(ctx),
            Consideration::Attack => attack_score(ctx),
            Consideration::HelpAlly => help_ally_score(ctx),
            Consideration::Eat => eat_score(ctx),
            Consideration::Rest => rest_score(ctx),
            Consideration::Group => group_score(ctx),
            Consideration::SeekResource => seek_resource_score(ctx),
            Consideration::Invade => invade_score(ctx),
            Consideration::Reproduce => reproduce_score(ctx),
            Consideration::Build => build_score(ctx),
        };
        if score.is_finite() {
            score.max(0.0)
        } else {
            0.0
        }
    }
}

fn flee_score(ctx: &TickContext<'_>) -> f64 {
    let bb = &*ctx.blackboard;
    if !bb.has_enemies() {
        return 0.0;
    }
    let w = &ctx.config.utility;
    let life = ctx.life_fraction();
    let advantage = bb.advantage();
    if life < w.flee_critical_life || advantage <= -w.flee_outnumbered_by {
        return w.flee_floor;
    }
    let bravery = ctx.agent.personality.bravery;
    let disadvantage = f64::from(advantage.min(0));
    (1.0 - life).powi(2) * w.flee_scale * (1.0 - (bravery - 50.0) / 100.0) * (1.0 - disadvantage * 0.2)
}

fn defend_score(ctx: &TickContext<'_>) -> f64 {
    if ctx.blackboard.intruder.is_none() {
        return 0.0;
    }
    ctx.config.utility.defend_score * (0.5 + ctx.agent.personality.bravery / 100.0)
}

fn attack_score(ctx: &TickContext<'_>) -> f64 {
    let Some((enemy_id, _)) = ctx.blackboard.nearest_enemy else {
        return 0.0;
    };
    if ctx.agent.vitals.energy < ctx.config.vitals.min_attack_energy {
        return 0.0;
    }
    let Some(enemy) = ctx.other(enemy_id) else {
        return 0.0;
    };
    let enemy_strength = ctx
        .view
        .species(enemy.species_id)
        .map_or(ctx.species.base_strength, |s| s.base_strength);
    let ratio = if enemy_strength > 0.0 {
        (ctx.species.base_strength / enemy_strength).clamp(0.5, 1.5)
    } else {
        1.5
    };
    let p = &ctx.agent.personality;
    let advantage = f64::from(ctx.blackboard.advantage());
    let personal = ctx.resolver.personal_score(ctx.agent, enemy);
    let grudge = if personal < 0.0 {
        1.0 + personal.abs() / 100.0
    } else {
        1.0
    };
    ctx.config.utility.attack_scale
        * ctx.life_fraction()
        * ratio
        * (1.0 + advantage * 0.3)
        * (0.75 + p.bravery / 200.0)
        * (0.8 + p.intelligence / 250.0)
        * grudge
}

fn help_ally_score(ctx: &TickContext<'_>) -> f64 {
    let Some(danger) = ctx.blackboard.ally_danger else {
        return 0.0;
    };
    let w = &ctx.config.utility;
    let score = w.help_scale * danger.urgency;
    if danger.ally_life < w.help_critical_life {
        score.max(w.help_floor)
    } else {
        score
    }
}

fn eat_score(ctx: &TickContext<'_>) -> f64 {
    let w = &ctx.config.utility;
    let hunger = ctx.agent.vitals.hunger;
    if hunger >= w.eat_critical_hunger {
        return w.eat_floor;
    }
    let opportunity = if query::inventory_food(ctx).is_some() || query::visible_food_node(ctx).is_some() {
        w.eat_opportunity_bonus
    } else {
        0.0
    };
    let base = w.eat_scale * (hunger / 100.0).powi(2)
        + ctx.agent.personality.greed * w.eat_greed_factor
        + opportunity;
    let caution = ctx.agent.personality.caution;
    let penalty = if caution > 50.0 && !query::in_friendly_territory(ctx) {
        1.0 - (caution - 50.0) / 50.0 * 0.8
    } else {
        1.0
    };
    base * penalty
}

fn rest_score(ctx: &TickContext<'_>) -> f64 {
    if ctx.blackboard.has_enemies() {
        return 0.0;
    }
    (1.0 - ctx.agent.vitals.energy / 100.0) * ctx.config.utility.rest_scale
}

fn group_score(ctx: &TickContext<'_>) -> f64 {
    let bb = &*ctx.blackboard;
    let objective = ctx.agent.clan_id.and_then(|c| ctx.view.objective_position(c));
    let Some(target) = objective.or(bb.ally_centroid) else {
        return 0.0;
    };
    let w = &ctx.config.utility;
    let allies = bb.allies.len().min(5) as f64;
    let mut score = w.group_scale * (ctx.agent.personality.sociability / 50.0) * (1.0 + 0.1 * allies);
    if ctx.agent.position.distance_to(&target) <= ctx.config.movement.grouping_distance {
        score *= 0.5;
    }
    if bb.opposite_gender_ally {
        score += w.group_mixed_gender_bonus;
    }
    score
}

/// Expansion drives are off in combat and when hunger or energy is critical.
fn expansion_gated(ctx: &TickContext<'_>) -> bool {
    let w = &ctx.config.utility;
    ctx.blackboard.has_enemies()
        || ctx.agent.vitals.hunger >= w.expansion_max_hunger
        || ctx.agent.vitals.energy < w.expansion_min_energy
}

fn seek_resource_score(ctx: &TickContext<'_>) -> f64 {
    if expansion_gated(ctx) || query::has_build_materials(ctx) {
        return 0.0;
    }
    if query::strategic_node(ctx).is_none() {
        return 0.0;
    }
    ctx.config.utility.seek_resource_scale * (0.5 + ctx.agent.personality.greed / 100.0)
}

fn invade_score(ctx: &TickContext<'_>) -> f64 {
    if expansion_gated(ctx) || query::raid_target(ctx).is_none() {
        return 0.0;
    }
    let p = &ctx.agent.personality;
    ctx.config.utility.invade_scale * (0.5 + p.bravery / 100.0) * (0.75 + p.greed / 200.0)
}

fn reproduce_score(ctx: &TickContext<'_>) -> f64 {
    let cfg = &ctx.config.reproduction;
    let agent = ctx.agent;
    if ctx.blackboard.has_enemies()
        || agent.on_reproduction_cooldown(ctx.view.tick(), cfg.cooldown_ticks)
        || agent.vitals.energy < cfg.min_energy
        || agent.vitals.hunger > cfg.max_hunger
    {
        return 0.0;
    }
    if query::partner(ctx).is_none() {
        return 0.0;
    }
    ctx.config.utility.reproduce_score
}

fn build_score(ctx: &TickContext<'_>) -> f64 {
    if ctx.blackboard.has_enemies() || !query::has_build_materials(ctx) {
        return 0.0;
    }
    ctx.config.utility.build_base + ctx.agent.personality.greed * 0.1
}

/// Picks the highest score strictly above `threshold`. The earliest entry
/// wins exact ties.
pub fn pick_best(scores: &[f64], threshold: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, score) in scores.iter().enumerate() {
        if *score > threshold && best.map_or(true, |(_, b)| *score > b) {
            best = Some((i, *score));
        }
    }
    best.map(|(i, _)| i)
}

/// The decision hub: considerations in registration order plus a default.
#[derive(Debug, Clone)]
pub struct UtilitySelector {
    options: Vec<(Consideration, Node)>,
    fallback: Box<Node>,
}

impl UtilitySelector {
    pub fn new(fallback: Node) -> Self {
        Self {
            options: Vec::new(),
            fallback: Box::new(fallback),
        }
    }

    /// Registers a consideration. Registration order breaks ties.
    pub fn with(mut self, consideration: Consideration, subtree: Node) -> Self {
        self.options.push((consideration, subtree));
        self
    }

    /// Scores every consideration after refreshing perception. Returns the
    /// index of the winner, if any scored above the threshold.
    pub fn evaluate(&self, ctx: &mut TickContext<'_>) -> Option<usize> {
        ctx.blackboard.clear();
        ctx.blackboard.perceive(ctx.agent, ctx.view, &ctx.resolver, ctx.config);

        let scores: Vec<f64> = self.options.iter().map(|(c, _)| c.score(ctx)).collect();
        ctx.blackboard.scores = self
            .options
            .iter()
            .zip(&scores)
            .map(|((c, _), s)| (c.name(), *s))
            .collect();
        pick_best(&scores, ctx.config.utility.threshold)
    }

    pub fn tick(&self, ctx: &mut TickContext<'_>) -> Result<NodeStatus, DecisionError> {
        let chosen = self.evaluate(ctx);

        let (status, used_default) = match chosen {
            Some(i) => match self.options[i].1.tick(ctx)? {
                NodeStatus::Failure => (self.fallback.tick(ctx)?, true),
                status => (status, false),
            },
            None => (self.fallback.tick(ctx)?, true),
        };

        let mut scores = Map::new();
        for (name, score) in &ctx.blackboard.scores {
            scores.insert((*name).to_string(), json!(score));
        }
        let chosen_name = chosen.map(|i| self.options[i].0.name());
        let builder = ctx.event(EventType::AiDecision).payload(json!({
            "scores": Value::Object(scores),
            "chosen": chosen_name,
            "used_default": used_default,
            "status": status.as_str(),
        }));
        ctx.emit(builder);
        Ok(status)
    }
}

/// The standard agent tree.
pub fn default_tree() -> Node {
    use ActionKind as A;
    use Condition as C;

    let cond = Node::Condition;
    let act = Node::Action;

    let selector = UtilitySelector::new(act(A::Wander))
        .with(
            Consideration::Flee,
            Node::sequence(vec![cond(C::IsEnemyNear), act(A::Flee)]),
        )
        .with(
            Consideration::DefendTerritory,
            Node::sequence(vec![cond(C::IsIntruderInTerritory), act(A::Attack)]),
        )
        .with(
            Consideration::Attack,
            Node::sequence(vec![cond(C::IsEnemyNear), act(A::Attack)]),
        )
        .with(
            Consideration::HelpAlly,
            Node::sequence(vec![cond(C::IsAllyInDanger), act(A::Attack)]),
        )
        .with(
            Consideration::Eat,
            Node::selector(vec![
                Node::sequence(vec![cond(C::HasFoodInInventory), act(A::EatFromInventory)]),
                Node::sequence(vec![cond(C::FindFoodResource), act(A::MoveToAndGather)]),
            ]),
        )
        .with(Consideration::Rest, act(A::Rest))
        .with(Consideration::Group, act(A::GroupOrFollowObjective))
        .with(
            Consideration::SeekResource,
            Node::sequence(vec![cond(C::FindStrategicResource), act(A::MoveToAndGather)]),
        )
        .with(
            Consideration::Invade,
            Node::sequence(vec![cond(C::FindRaidTarget), act(A::Invade)]),
        )
        .with(
            Consideration::Reproduce,
            Node::sequence(vec![cond(C::HasPartner), act(A::Reproduce)]),
        )
        .with(
            Consideration::Build,
            Node::sequence(vec![cond(C::HasBuildMaterials), act(A::Build)]),
        );

    Node::Utility(selector)
}
