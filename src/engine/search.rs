//! Branch-and-bound CP solver.
//!
//! # Algorithm
//!
//! Depth-first search over bound domains `[lo, hi]`:
//!
//! 1. Propagate to a fixpoint: interval links, linear bounds reasoning,
//!    max-equality, decided machine orderings, and orderings forced by the
//!    current bounds. Then run an overload check on each no-overlap group.
//! 2. Branch on an undecided pair of a no-overlap group (the pair whose
//!    earliest start is smallest; the earlier task goes first).
//! 3. Once every pair is ordered, label the remaining variables
//!    (`x = lo` before `x >= lo + 1`).
//! 4. Each leaf is an improving solution; the objective bound is tightened
//!    to strictly better and search continues.
//!
//! Exhausting the tree proves optimality (or infeasibility).
//!
//! # Reference
//! Baptiste, Le Pape & Nuijten (2001), "Constraint-Based Scheduling", Ch. 2 & 4

use std::time::Instant;

use super::model::{Constraint, CpModel, Objective};
use super::solver::{CpSolution, CpSolver, SearchStats, SolverConfig, SolverStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    lo: i64,
    hi: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
    Undecided,
    FirstBefore,
    SecondBefore,
}

impl Order {
    fn opposite(self) -> Self {
        match self {
            Order::FirstBefore => Order::SecondBefore,
            Order::SecondBefore => Order::FirstBefore,
            Order::Undecided => Order::Undecided,
        }
    }
}

/// Some domain became empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Conflict;

type Propagation = Result<(), Conflict>;

#[derive(Debug, Clone)]
struct Node {
    bounds: Vec<Bounds>,
    orders: Vec<Order>,
}

#[derive(Debug, Clone, Copy)]
enum Decision {
    Root,
    Order { pair: usize, order: Order },
    Fix { var: usize, value: i64 },
    Above { var: usize, value: i64 },
}

#[derive(Debug, Clone, Copy)]
struct Task {
    start: usize,
    end: usize,
    duration: i64,
}

#[derive(Debug, Clone, Copy)]
struct Pair {
    first: usize,
    second: usize,
}

#[derive(Debug, Clone)]
struct Linear {
    terms: Vec<(usize, i64)>,
    lower_bound: i64,
}

#[derive(Debug, Clone)]
struct MaxEq {
    target: usize,
    vars: Vec<usize>,
}

/// Why the search loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Exhausted,
    Limit,
    FirstSolution,
    Satisfied,
}

/// Index-based form of a validated [`CpModel`].
#[derive(Debug, Clone)]
struct Problem {
    initial: Vec<Bounds>,
    tasks: Vec<Task>,
    groups: Vec<Vec<usize>>,
    pairs: Vec<Pair>,
    linears: Vec<Linear>,
    maxes: Vec<MaxEq>,
    objective: Option<Objective>,
}

impl Problem {
    fn compile(model: &CpModel) -> Self {
        let initial = model
            .int_vars()
            .iter()
            .map(|v| Bounds { lo: v.min, hi: v.max })
            .collect();
        let tasks = model
            .intervals()
            .iter()
            .map(|iv| Task {
                start: iv.start.index(),
                end: iv.end.index(),
                duration: iv.duration,
            })
            .collect::<Vec<_>>();

        let mut groups = Vec::new();
        let mut pairs = Vec::new();
        let mut linears = Vec::new();
        let mut maxes = Vec::new();

        for constraint in model.constraints() {
            match constraint {
                Constraint::NoOverlap { intervals } => {
                    // Zero-length intervals never overlap anything.
                    let mut group: Vec<usize> = Vec::with_capacity(intervals.len());
                    for id in intervals {
                        let t = id.index();
                        if tasks[t].duration > 0 && !group.contains(&t) {
                            group.push(t);
                        }
                    }
                    for i in 0..group.len() {
                        for j in (i + 1)..group.len() {
                            pairs.push(Pair {
                                first: group[i],
                                second: group[j],
                            });
                        }
                    }
                    groups.push(group);
                }
                Constraint::Linear { terms, lower_bound } => {
                    linears.push(Linear {
                        terms: terms.iter().map(|&(v, c)| (v.index(), c)).collect(),
                        lower_bound: *lower_bound,
                    });
                }
                Constraint::MaxEquality { target, vars } => {
                    maxes.push(MaxEq {
                        target: target.index(),
                        vars: vars.iter().map(|v| v.index()).collect(),
                    });
                }
            }
        }

        Self {
            initial,
            tasks,
            groups,
            pairs,
            linears,
            maxes,
            objective: model.objective(),
        }
    }

    fn root(&self) -> Node {
        Node {
            bounds: self.initial.clone(),
            orders: vec![Order::Undecided; self.pairs.len()],
        }
    }

    /// Runs all propagators until no bound moves, then the overload check.
    fn propagate(&self, node: &mut Node) -> Propagation {
        let Node { bounds, orders } = node;
        loop {
            let mut dom = Domains::new(bounds);

            for task in &self.tasks {
                propagate_link(&mut dom, task)?;
            }
            for linear in &self.linears {
                propagate_linear(&mut dom, linear)?;
            }
            for max in &self.maxes {
                propagate_max(&mut dom, max)?;
            }
            for (idx, pair) in self.pairs.iter().enumerate() {
                let a = &self.tasks[pair.first];
                let b = &self.tasks[pair.second];
                match orders[idx] {
                    Order::FirstBefore => precede(&mut dom, a, b)?,
                    Order::SecondBefore => precede(&mut dom, b, a)?,
                    Order::Undecided => {
                        let a_first = dom.get(a.end).lo <= dom.get(b.start).hi;
                        let b_first = dom.get(b.end).lo <= dom.get(a.start).hi;
                        match (a_first, b_first) {
                            (false, false) => return Err(Conflict),
                            (true, false) => {
                                orders[idx] = Order::FirstBefore;
                                dom.changed = true;
                                precede(&mut dom, a, b)?;
                            }
                            (false, true) => {
                                orders[idx] = Order::SecondBefore;
                                dom.changed = true;
                                precede(&mut dom, b, a)?;
                            }
                            (true, true) => {}
                        }
                    }
                }
            }

            if !dom.changed {
                break;
            }
        }

        self.check_overload(bounds)
    }

    /// Fails when the tasks confined to some window `[est, lct]` need more
    /// time than the window has.
    fn check_overload(&self, bounds: &[Bounds]) -> Propagation {
        for group in &self.groups {
            if group.len() < 2 {
                continue;
            }

            let mut windows: Vec<(i64, i64, i64)> = group
                .iter()
                .map(|&t| {
                    let task = &self.tasks[t];
                    (bounds[task.start].lo, bounds[task.end].hi, task.duration)
                })
                .collect();
            windows.sort_unstable_by(|a, b| b.0.cmp(&a.0));

            let mut lcts: Vec<i64> = windows.iter().map(|w| w.1).collect();
            lcts.sort_unstable();
            lcts.dedup();

            for &lct in &lcts {
                let mut work: i128 = 0;
                for &(est, task_lct, duration) in &windows {
                    if task_lct > lct {
                        continue;
                    }
                    work += i128::from(duration);
                    if work > i128::from(lct) - i128::from(est) {
                        return Err(Conflict);
                    }
                }
            }
        }
        Ok(())
    }

    fn apply(&self, node: &mut Node, decision: Decision) -> Propagation {
        let mut dom = Domains::new(&mut node.bounds);
        match decision {
            Decision::Root => Ok(()),
            Decision::Order { pair, order } => {
                node.orders[pair] = order;
                Ok(())
            }
            Decision::Fix { var, value } => {
                dom.set_lo(var, i128::from(value))?;
                dom.set_hi(var, i128::from(value))
            }
            Decision::Above { var, value } => dom.set_lo(var, i128::from(value) + 1),
        }
    }

    /// Restricts the objective to values strictly better than `best`.
    fn cut(&self, node: &mut Node, best: Option<i64>) -> Propagation {
        let (Some(objective), Some(best)) = (self.objective, best) else {
            return Ok(());
        };
        let mut dom = Domains::new(&mut node.bounds);
        match objective {
            Objective::Minimize(v) => dom.set_hi(v.index(), i128::from(best) - 1),
            Objective::Maximize(v) => dom.set_lo(v.index(), i128::from(best) + 1),
        }
    }

    /// Picks the undecided pair with the earliest possible start.
    fn select_pair(&self, node: &Node) -> Option<(usize, Order)> {
        let mut best: Option<((i64, i64), usize)> = None;

        for (idx, pair) in self.pairs.iter().enumerate() {
            if node.orders[idx] != Order::Undecided {
                continue;
            }
            let ea = node.bounds[self.tasks[pair.first].start].lo;
            let eb = node.bounds[self.tasks[pair.second].start].lo;
            let key = (ea.min(eb), ea.max(eb));
            if best.map_or(true, |(k, _)| key < k) {
                best = Some((key, idx));
            }
        }

        best.map(|(_, idx)| {
            let a = &self.tasks[self.pairs[idx].first];
            let b = &self.tasks[self.pairs[idx].second];
            let ka = (node.bounds[a.start].lo, node.bounds[a.end].lo);
            let kb = (node.bounds[b.start].lo, node.bounds[b.end].lo);
            let order = if ka <= kb {
                Order::FirstBefore
            } else {
                Order::SecondBefore
            };
            (idx, order)
        })
    }

    fn select_var(&self, node: &Node) -> Option<usize> {
        node.bounds.iter().position(|b| b.lo < b.hi)
    }

    /// Checks a full assignment against every constraint.
    fn is_satisfied(&self, values: &[i64]) -> bool {
        let in_domain = values
            .iter()
            .zip(&self.initial)
            .all(|(&v, b)| b.lo <= v && v <= b.hi);
        let links = self
            .tasks
            .iter()
            .all(|t| values[t.end] == values[t.start] + t.duration);
        let linears = self.linears.iter().all(|l| {
            let sum: i128 = l
                .terms
                .iter()
                .map(|&(v, c)| i128::from(c) * i128::from(values[v]))
                .sum();
            sum >= i128::from(l.lower_bound)
        });
        let maxes = self
            .maxes
            .iter()
            .all(|m| m.vars.iter().map(|&v| values[v]).max() == Some(values[m.target]));
        let disjoint = self.pairs.iter().all(|p| {
            let a = &self.tasks[p.first];
            let b = &self.tasks[p.second];
            values[a.end] <= values[b.start] || values[b.end] <= values[a.start]
        });
        in_domain && links && linears && maxes && disjoint
    }
}

/// Mutable view over a node's bounds that records whether anything moved.
struct Domains<'a> {
    bounds: &'a mut [Bounds],
    changed: bool,
}

impl<'a> Domains<'a> {
    fn new(bounds: &'a mut [Bounds]) -> Self {
        Self {
            bounds,
            changed: false,
        }
    }

    #[inline]
    fn get(&self, var: usize) -> Bounds {
        self.bounds[var]
    }

    fn set_lo(&mut self, var: usize, value: i128) -> Propagation {
        let b = &mut self.bounds[var];
        if value > i128::from(b.hi) {
            return Err(Conflict);
        }
        if value > i128::from(b.lo) {
            // value <= hi, so it fits in i64
            b.lo = value as i64;
            self.changed = true;
        }
        Ok(())
    }

    fn set_hi(&mut self, var: usize, value: i128) -> Propagation {
        let b = &mut self.bounds[var];
        if value < i128::from(b.lo) {
            return Err(Conflict);
        }
        if value < i128::from(b.hi) {
            b.hi = value as i64;
            self.changed = true;
        }
        Ok(())
    }
}

/// `end = start + duration`.
fn propagate_link(dom: &mut Domains<'_>, task: &Task) -> Propagation {
    let d = i128::from(task.duration);
    let s = dom.get(task.start);
    dom.set_lo(task.end, i128::from(s.lo) + d)?;
    dom.set_hi(task.end, i128::from(s.hi) + d)?;
    let e = dom.get(task.end);
    dom.set_lo(task.start, i128::from(e.lo) - d)?;
    dom.set_hi(task.start, i128::from(e.hi) - d)
}

/// Bounds reasoning for `sum(c * x) >= lower_bound`.
fn propagate_linear(dom: &mut Domains<'_>, linear: &Linear) -> Propagation {
    let term_max = |b: Bounds, c: i64| {
        if c > 0 {
            i128::from(c) * i128::from(b.hi)
        } else {
            i128::from(c) * i128::from(b.lo)
        }
    };

    let max_sum: i128 = linear
        .terms
        .iter()
        .map(|&(v, c)| term_max(dom.get(v), c))
        .sum();
    let lower_bound = i128::from(linear.lower_bound);
    if max_sum < lower_bound {
        return Err(Conflict);
    }

    for &(v, c) in &linear.terms {
        if c == 0 {
            continue;
        }
        let rest = max_sum - term_max(dom.get(v), c);
        let need = lower_bound - rest;
        if c > 0 {
            dom.set_lo(v, div_ceil(need, i128::from(c)))?;
        } else {
            dom.set_hi(v, div_floor(need, i128::from(c)))?;
        }
    }
    Ok(())
}

/// Bounds reasoning for `target = max(vars)`.
fn propagate_max(dom: &mut Domains<'_>, max: &MaxEq) -> Propagation {
    let max_lo = max.vars.iter().map(|&v| dom.get(v).lo).max();
    let max_hi = max.vars.iter().map(|&v| dom.get(v).hi).max();
    let (Some(max_lo), Some(max_hi)) = (max_lo, max_hi) else {
        return Err(Conflict);
    };
    dom.set_lo(max.target, i128::from(max_lo))?;
    dom.set_hi(max.target, i128::from(max_hi))?;

    let target = dom.get(max.target);
    for &v in &max.vars {
        dom.set_hi(v, i128::from(target.hi))?;
    }

    // A single operand able to reach the target's minimum must reach it.
    let mut supports = max.vars.iter().filter(|&&v| dom.get(v).hi >= target.lo);
    match (supports.next(), supports.next()) {
        (None, _) => Err(Conflict),
        (Some(&v), None) => dom.set_lo(v, i128::from(target.lo)),
        _ => Ok(()),
    }
}

/// `end(a) <= start(b)`.
fn precede(dom: &mut Domains<'_>, a: &Task, b: &Task) -> Propagation {
    let a_end = dom.get(a.end);
    dom.set_lo(b.start, i128::from(a_end.lo))?;
    let b_start = dom.get(b.start);
    dom.set_hi(a.end, i128::from(b_start.hi))
}

fn div_floor(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

fn div_ceil(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && ((a < 0) == (b < 0)) {
        q + 1
    } else {
        q
    }
}

/// Complete branch-and-bound solver for disjunctive scheduling models.
///
/// Supports every constraint of [`CpModel`]. Proves optimality when the
/// search runs to completion; with a time or node limit it returns the
/// best solution found so far.
///
/// # Example
///
/// ```
/// use u_jobshop::engine::{BranchAndBoundSolver, CpModel, CpSolver, SolverConfig, SolverStatus};
///
/// let mut model = CpModel::new("two-ops");
/// let s1 = model.new_int_var(0, 10, "s1");
/// let e1 = model.new_int_var(0, 10, "e1");
/// let s2 = model.new_int_var(0, 10, "s2");
/// let e2 = model.new_int_var(0, 10, "e2");
/// let a = model.new_interval_var(s1, 3, e1, "a");
/// let b = model.new_interval_var(s2, 4, e2, "b");
/// model.add_no_overlap([a, b]);
/// let makespan = model.new_int_var(0, 10, "makespan");
/// model.add_max_equality(makespan, [e1, e2]);
/// model.minimize(makespan);
///
/// let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
/// assert_eq!(solution.status, SolverStatus::Optimal);
/// assert_eq!(solution.objective_value, Some(7));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    pub fn new() -> Self {
        Self
    }

    fn search(problem: &Problem, config: &SolverConfig, started: Instant) -> CpSolution {
        let mut stats = SearchStats::default();
        let mut best: Option<(Vec<i64>, Option<i64>)> = None;
        let mut stack = vec![(problem.root(), Decision::Root)];

        let stop = loop {
            let Some((mut node, decision)) = stack.pop() else {
                break Stop::Exhausted;
            };

            if config.node_limit.is_some_and(|n| stats.nodes >= n)
                || config
                    .time_limit_ms
                    .is_some_and(|ms| elapsed_ms(started) >= ms)
            {
                break Stop::Limit;
            }
            stats.nodes += 1;

            let best_value = best.as_ref().and_then(|(_, obj)| *obj);
            let consistent = problem
                .apply(&mut node, decision)
                .and_then(|()| problem.cut(&mut node, best_value))
                .and_then(|()| problem.propagate(&mut node));
            if consistent.is_err() {
                stats.failures += 1;
                continue;
            }

            if let Some((pair, order)) = problem.select_pair(&node) {
                stack.push((
                    node.clone(),
                    Decision::Order {
                        pair,
                        order: order.opposite(),
                    },
                ));
                stack.push((node, Decision::Order { pair, order }));
                continue;
            }

            if let Some(var) = problem.select_var(&node) {
                let value = node.bounds[var].lo;
                stack.push((node.clone(), Decision::Above { var, value }));
                stack.push((node, Decision::Fix { var, value }));
                continue;
            }

            let values: Vec<i64> = node.bounds.iter().map(|b| b.lo).collect();
            debug_assert!(problem.is_satisfied(&values), "leaf violates the model");
            let objective_value = problem.objective.map(|o| values[o.var().index()]);
            stats.solutions += 1;
            best = Some((values, objective_value));

            if problem.objective.is_none() {
                break Stop::Satisfied;
            }
            if config.stop_after_first {
                break Stop::FirstSolution;
            }
        };

        let status = match (stop, best.is_some()) {
            (Stop::Exhausted, true) | (Stop::Satisfied, _) => SolverStatus::Optimal,
            (Stop::FirstSolution, _) if stack.is_empty() => SolverStatus::Optimal,
            (Stop::FirstSolution, _) | (Stop::Limit, true) => SolverStatus::Feasible,
            (Stop::Exhausted, false) => SolverStatus::Infeasible,
            (Stop::Limit, false) => SolverStatus::Unknown,
        };

        let (values, objective_value) = best.unwrap_or_default();
        CpSolution {
            status,
            objective_value,
            values,
            solve_time_ms: elapsed_ms(started),
            stats,
        }
    }
}

impl CpSolver for BranchAndBoundSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        if model.validate().is_err() {
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }

        let started = Instant::now();
        let problem = Problem::compile(model);
        Self::search(&problem, config, started)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
