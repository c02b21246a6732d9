//! The multi-criteria label-setting search.
//!
//! Seeds a root label, repeatedly pops the lexicographically best frontier
//! label, asks the explorer for its viable successor edges, and inserts the
//! surviving candidates back through the dominance protocol. Terminates on
//! an empty frontier, the label-setting cutoff, the profile-window closure,
//! or the node budget. Exhausting the budget is reported as an explicit
//! incomplete search, never as an empty success.

use tracing::{debug, trace};

use crate::domain::{EdgeId, LabelId, NodeId, Timestamp};
use crate::network::{Calendar, RealtimeOverlay, TransitNetwork};

use super::config::{Direction, QueryMode, SearchOptions};
use super::explorer::EdgeExplorer;
use super::frontier::{FrontierQueue, QueueKey};
use super::itinerary::edge_path;
use super::label::{Label, LabelArena};

/// Error from a journey search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The source node id is not part of the network.
    #[error("source node {0} is out of range")]
    SourceOutOfRange(NodeId),

    /// A target node id is not part of the network.
    #[error("target node {0} is out of range")]
    TargetOutOfRange(NodeId),

    /// The request carried no target nodes.
    #[error("at least one target node is required")]
    NoTargets,

    /// The node budget was zero.
    #[error("node budget must be positive")]
    ZeroNodeBudget,

    /// The label capacity was zero.
    #[error("label capacity must be positive")]
    ZeroLabelCapacity,

    /// The search ran out of budget before reaching a termination
    /// condition. Distinct from an empty result: the caller may retry with
    /// a larger budget.
    #[error("search incomplete: budget exhausted after {visited_nodes} expansions")]
    Incomplete { visited_nodes: usize },
}

/// A journey search: where from, where to, when.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Node the search starts at (the destination in reverse mode).
    pub source: NodeId,

    /// Nodes the search is looking for.
    pub targets: Vec<NodeId>,

    /// Departure instant (arrival instant in reverse mode).
    pub start_time: Timestamp,

    /// Query knobs.
    pub options: SearchOptions,
}

impl SearchRequest {
    /// A request with default options.
    pub fn new(source: NodeId, targets: Vec<NodeId>, start_time: Timestamp) -> Self {
        Self {
            source,
            targets,
            start_time,
            options: SearchOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Reject configuration errors before any search state is built.
    pub fn validate<G: TransitNetwork>(&self, network: &G) -> Result<(), SearchError> {
        if self.targets.is_empty() {
            return Err(SearchError::NoTargets);
        }
        if !network.contains_node(self.source) {
            return Err(SearchError::SourceOutOfRange(self.source));
        }
        for &target in &self.targets {
            if !network.contains_node(target) {
                return Err(SearchError::TargetOutOfRange(target));
            }
        }
        if self.options.node_budget == 0 {
            return Err(SearchError::ZeroNodeBudget);
        }
        if self.options.label_capacity == 0 {
            return Err(SearchError::ZeroLabelCapacity);
        }
        Ok(())
    }
}

/// One surviving itinerary at a target node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// The target node reached.
    pub node: NodeId,
    /// Arrival instant (departure instant in reverse mode).
    pub time: Timestamp,
    /// Boardings along the journey.
    pub transfers: u32,
    /// Instant of the first boarding; `None` for walk-only journeys.
    pub first_departure: Option<Timestamp>,
    /// Edge ids of the journey, in travel order.
    pub edges: Vec<EdgeId>,
}

/// Result of a completed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// The non-dominated target solutions. Empty means no route exists,
    /// a legitimate outcome rather than an error.
    pub solutions: Vec<Solution>,

    /// Number of labels expanded.
    pub visited_nodes: usize,
}

/// Journey planner over one network, calendar and realtime snapshot.
///
/// Holds only shared references; all per-query state lives inside
/// [`Planner::search`], so independent queries may run concurrently on
/// separate threads against the same collaborators without locking.
#[derive(Debug, Clone, Copy)]
pub struct Planner<'a, G> {
    network: &'a G,
    calendar: &'a Calendar,
    realtime: &'a RealtimeOverlay,
}

impl<'a, G: TransitNetwork> Planner<'a, G> {
    pub fn new(network: &'a G, calendar: &'a Calendar, realtime: &'a RealtimeOverlay) -> Self {
        Self {
            network,
            calendar,
            realtime,
        }
    }

    /// Run a search to completion.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        request.validate(self.network)?;

        let opts = &request.options;
        let mut is_target = vec![false; self.network.node_count()];
        for &target in &request.targets {
            is_target[target.index()] = true;
        }

        let mut query = Query {
            network: self.network,
            calendar: self.calendar,
            realtime: self.realtime,
            direction: opts.direction,
            mode: opts.mode,
            start: request.start_time,
            window_millis: opts.max_profile_window_millis(),
            node_budget: opts.node_budget,
            label_capacity: opts.label_capacity,
            limit_solutions: opts.limit_solutions,
            is_target,
            arena: LabelArena::new(),
            frontier: FrontierQueue::new(opts.label_capacity),
            node_fronts: vec![Vec::new(); self.network.node_count()],
            solution_front: Vec::new(),
            walk_solution: None,
            visited: 0,
        };
        query.run(request.source)
    }
}

/// All mutable state of one running query.
struct Query<'a, G> {
    network: &'a G,
    calendar: &'a Calendar,
    realtime: &'a RealtimeOverlay,
    direction: Direction,
    mode: QueryMode,
    start: Timestamp,
    window_millis: i64,
    node_budget: usize,
    label_capacity: usize,
    limit_solutions: usize,
    is_target: Vec<bool>,
    arena: LabelArena,
    frontier: FrontierQueue,
    /// Per-node sets of non-dominated labels.
    node_fronts: Vec<Vec<LabelId>>,
    /// The separate Pareto set of labels at target nodes.
    solution_front: Vec<LabelId>,
    /// A retained walk-only solution, if any. Valid at every departure
    /// instant, so it closes the profile window once found.
    walk_solution: Option<LabelId>,
    visited: usize,
}

impl<G: TransitNetwork> Query<'_, G> {
    fn run(&mut self, source: NodeId) -> Result<SearchResult, SearchError> {
        let root = Label::root(source, self.start);
        let root_id = self
            .admit(root)?
            .expect("the root label is never dominated");
        if self.is_target[source.index()] {
            self.accept_solution(root_id);
        }

        while let Some((id, key)) = self.frontier.pop() {
            if self.done(key.time) {
                break;
            }
            if self.visited >= self.node_budget {
                debug!(visited = self.visited, "node budget exhausted");
                return Err(SearchError::Incomplete {
                    visited_nodes: self.visited,
                });
            }
            self.visited += 1;
            self.expand(id)?;
        }

        Ok(self.finish())
    }

    /// Termination test against the best open frontier bound.
    fn done(&self, best_open_time: i64) -> bool {
        if self.solution_front.len() >= self.limit_solutions {
            return true;
        }
        match self.mode {
            QueryMode::Point => self
                .worst_solution_time()
                .is_some_and(|worst| best_open_time > worst),
            QueryMode::Profile => {
                let Some(worst) = self.worst_solution_time() else {
                    return false;
                };
                let bound = match self.walk_solution {
                    // A walk solution recurs at every departure instant, so
                    // it closes the window: anything arriving after its
                    // recurrence at the far end of the window is dominated.
                    Some(walk) => {
                        let walk_time = self.rel_time(self.arena.get(walk).time);
                        worst.max(walk_time + self.window_millis)
                    }
                    None => worst + self.window_millis,
                };
                best_open_time > bound
            }
        }
    }

    fn worst_solution_time(&self) -> Option<i64> {
        self.solution_front
            .iter()
            .map(|&id| self.rel_time(self.arena.get(id).time))
            .max()
    }

    /// Time progressed since the query start, direction-normalized.
    fn rel_time(&self, time: Timestamp) -> i64 {
        self.direction.sign() * (time.as_millis() - self.start.as_millis())
    }

    fn expand(&mut self, id: LabelId) -> Result<(), SearchError> {
        let label = *self.arena.get(id);
        let explorer =
            EdgeExplorer::new(self.network, self.calendar, self.realtime, self.direction);
        let sign = self.direction.sign();

        for edge in explorer.successors(&label) {
            let cost = explorer.traversal_time(edge, label.time);
            debug_assert!(cost >= 0, "admitted edges never cost negative time");

            let time = Timestamp::from_millis(label.time.as_millis() + sign * cost);
            let transfers = label.transfers + u32::from(edge.boards);
            let first_departure = if edge.boards && label.first_departure.is_none() {
                Some(time)
            } else {
                label.first_departure
            };
            let node = match self.direction {
                Direction::Forward => edge.to,
                Direction::Reverse => edge.from,
            };
            let candidate = Label {
                time,
                node,
                edge: Some(edge.id),
                transfers,
                first_departure,
                parent: Some(id),
            };

            if self.dominated_by_solutions(&candidate) {
                continue;
            }
            let Some(new_id) = self.admit(candidate)? else {
                continue;
            };
            if self.is_target[node.index()] {
                self.accept_solution(new_id);
            }
        }
        Ok(())
    }

    /// The improves-then-evict insertion protocol against the candidate's
    /// node set. Returns the stored handle, or `None` when the candidate is
    /// dominated (or duplicates) an existing member.
    fn admit(&mut self, candidate: Label) -> Result<Option<LabelId>, SearchError> {
        let node = candidate.node.index();
        if !self.improves(&candidate, &self.node_fronts[node]) {
            return Ok(None);
        }

        let evicted: Vec<LabelId> = self.node_fronts[node]
            .iter()
            .copied()
            .filter(|&member| self.prunes(&candidate, self.arena.get(member)))
            .collect();
        for member in evicted {
            self.evict(member);
        }

        if self.arena.len() >= self.label_capacity {
            debug!(labels = self.arena.len(), "label capacity exhausted");
            return Err(SearchError::Incomplete {
                visited_nodes: self.visited,
            });
        }

        if let Some(parent) = candidate.parent {
            let parent_time = self.arena.get(parent).time;
            debug_assert!(
                self.rel_time(candidate.time) >= self.rel_time(parent_time),
                "time must not regress along a parent chain"
            );
        }

        let key = self.queue_key(&candidate);
        let id = self.arena.push(candidate);
        self.node_fronts[node].push(id);
        self.frontier
            .push(id, key)
            .expect("a fresh label handle is always pushable");

        #[cfg(debug_assertions)]
        self.assert_front_invariant(node);

        Ok(Some(id))
    }

    /// True when no member of `front` prunes the candidate.
    fn improves(&self, candidate: &Label, front: &[LabelId]) -> bool {
        !front
            .iter()
            .any(|&member| self.prunes(self.arena.get(member), candidate))
    }

    /// Whether `winner` both may and does supersede `loser`.
    fn prunes(&self, winner: &Label, loser: &Label) -> bool {
        if self.mode == QueryMode::Profile && !self.profile_comparable(winner, loser) {
            return false;
        }
        winner.dominates(loser, self.direction) || winner.criteria_eq(loser)
    }

    /// In profile mode a label may supersede another only when doing so
    /// cannot hide a distinct departure bucket: the loser has no departure
    /// yet, or the winner departs at or after it (mirrored in reverse), or
    /// the winner's departure already lies beyond the profile window.
    fn profile_comparable(&self, winner: &Label, loser: &Label) -> bool {
        let Some(loser_dep) = loser.first_departure else {
            return true;
        };
        let Some(winner_dep) = winner.first_departure else {
            return false;
        };
        let at_or_after = match self.direction {
            Direction::Forward => winner_dep >= loser_dep,
            Direction::Reverse => winner_dep <= loser_dep,
        };
        at_or_after || self.rel_time(winner_dep) >= self.window_millis
    }

    fn dominated_by_solutions(&self, candidate: &Label) -> bool {
        self.solution_front
            .iter()
            .any(|&member| self.prunes(self.arena.get(member), candidate))
    }

    /// Remove a superseded label from every structure referencing it: its
    /// node set, the frontier, and the solution set. The only place
    /// removal happens, so the three stay consistent.
    fn evict(&mut self, id: LabelId) {
        let node = self.arena.get(id).node.index();
        let front = &mut self.node_fronts[node];
        let pos = front
            .iter()
            .position(|&member| member == id)
            .expect("evicted label must be in its node set");
        front.remove(pos);

        self.frontier
            .remove(id)
            .expect("evicted label must still be queued");

        if let Some(pos) = self.solution_front.iter().position(|&member| member == id) {
            self.solution_front.remove(pos);
            if self.walk_solution == Some(id) {
                self.walk_solution = None;
            }
        }
    }

    /// Insert a label at a target node into the solution set, evicting the
    /// solutions it supersedes.
    fn accept_solution(&mut self, id: LabelId) {
        let label = *self.arena.get(id);
        if !self.improves(&label, &self.solution_front) {
            return;
        }

        let mut index = 0;
        while index < self.solution_front.len() {
            let member = self.solution_front[index];
            if self.prunes(&label, self.arena.get(member)) {
                self.solution_front.remove(index);
                if self.walk_solution == Some(member) {
                    self.walk_solution = None;
                }
            } else {
                index += 1;
            }
        }

        self.solution_front.push(id);
        if label.is_pure_walk() && self.walk_solution.is_none() {
            self.walk_solution = Some(id);
            trace!(time = %label.time, "walk-only solution retained");
        }
        trace!(
            node = %label.node,
            time = %label.time,
            transfers = label.transfers,
            "solution retained"
        );
    }

    fn queue_key(&self, label: &Label) -> QueueKey {
        let departure = match label.first_departure {
            Some(dep) => -self.direction.sign() * (dep.as_millis() - self.start.as_millis()),
            None => 0,
        };
        QueueKey::new(self.rel_time(label.time), label.transfers, departure)
    }

    fn finish(&self) -> SearchResult {
        let mut solutions: Vec<Solution> = self
            .solution_front
            .iter()
            .map(|&id| {
                let label = self.arena.get(id);
                Solution {
                    node: label.node,
                    time: label.time,
                    transfers: label.transfers,
                    first_departure: label.first_departure,
                    edges: edge_path(&self.arena, id, self.direction),
                }
            })
            .collect();
        solutions.sort_by_key(|s| {
            (
                s.first_departure.map_or(i64::MIN, Timestamp::as_millis),
                s.time.as_millis(),
                s.transfers,
                s.node.0,
            )
        });

        debug!(
            solutions = solutions.len(),
            visited = self.visited,
            "search complete"
        );
        SearchResult {
            solutions,
            visited_nodes: self.visited,
        }
    }

    /// No member of a node set may supersede another.
    #[cfg(debug_assertions)]
    fn assert_front_invariant(&self, node: usize) {
        let front = &self.node_fronts[node];
        for (i, &a) in front.iter().enumerate() {
            for &b in &front[i + 1..] {
                let (la, lb) = (self.arena.get(a), self.arena.get(b));
                debug_assert!(
                    !self.prunes(la, lb) && !self.prunes(lb, la),
                    "node set holds a superseded label"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TimeOfDay, ValidityId};
    use crate::network::{Edge, Network, NetworkBuilder};
    use chrono::NaiveDate;

    /// Opt-in test logging: `RUST_LOG=transit_planner=trace cargo test`.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn tod(seconds: i64) -> TimeOfDay {
        TimeOfDay::from_millis(seconds * 1000).unwrap()
    }

    fn at(seconds: i64) -> Timestamp {
        Timestamp::from_millis(seconds * 1000)
    }

    /// Calendar from the epoch day with one always-on pattern at id 0.
    fn daily_calendar() -> (Calendar, ValidityId) {
        let mut cal = Calendar::new(NaiveDate::default(), 30);
        let daily = cal.add_daily_pattern();
        (cal, daily)
    }

    /// A → B board (departs 100), B → C alight (arrives 200).
    fn board_alight_network() -> (Network, Calendar) {
        let (cal, daily) = daily_calendar();
        let mut b = NetworkBuilder::new(3);
        b.add_edge(|id| Edge::board(id, NodeId(0), NodeId(1), tod(100), daily));
        b.add_edge(|id| Edge::alight(id, NodeId(1), NodeId(2), tod(200), daily));
        (b.build(), cal)
    }

    #[test]
    fn board_alight_scenario() {
        init_tracing();
        let (net, cal) = board_alight_network();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        let request = SearchRequest::new(NodeId(0), vec![NodeId(2)], at(50));
        let result = planner.search(&request).unwrap();

        assert_eq!(result.solutions.len(), 1);
        let solution = &result.solutions[0];
        assert_eq!(solution.time, at(200));
        assert_eq!(solution.transfers, 1);
        assert_eq!(solution.first_departure, Some(at(100)));
        assert_eq!(solution.edges, vec![EdgeId(0), EdgeId(1)]);
        assert_eq!(solution.node, NodeId(2));
    }

    #[test]
    fn missed_departure_yields_empty_not_stale() {
        let (net, cal) = board_alight_network();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        // A solution exists for an earlier query...
        let early = SearchRequest::new(NodeId(0), vec![NodeId(2)], at(50));
        assert_eq!(planner.search(&early).unwrap().solutions.len(), 1);

        // ...but at 150 the only departure is gone: a clean empty result,
        // not an error and not a label left over from the earlier run.
        let late = SearchRequest::new(NodeId(0), vec![NodeId(2)], at(150));
        let result = planner.search(&late).unwrap();
        assert!(result.solutions.is_empty());
    }

    #[test]
    fn budget_exhaustion_is_an_error() {
        let (cal, _) = daily_calendar();
        let mut b = NetworkBuilder::new(3);
        b.add_edge(|id| Edge::street(id, NodeId(0), NodeId(1), 10_000));
        b.add_edge(|id| Edge::street(id, NodeId(1), NodeId(2), 10_000));
        let net = b.build();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        let request = SearchRequest::new(NodeId(0), vec![NodeId(2)], at(0)).with_options(
            SearchOptions {
                node_budget: 1,
                ..SearchOptions::default()
            },
        );

        assert_eq!(
            planner.search(&request),
            Err(SearchError::Incomplete { visited_nodes: 1 })
        );
    }

    #[test]
    fn label_capacity_exhaustion_is_an_error() {
        let (cal, _) = daily_calendar();
        let mut b = NetworkBuilder::new(3);
        b.add_edge(|id| Edge::street(id, NodeId(0), NodeId(1), 10_000));
        b.add_edge(|id| Edge::street(id, NodeId(1), NodeId(2), 10_000));
        let net = b.build();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        let request = SearchRequest::new(NodeId(0), vec![NodeId(2)], at(0)).with_options(
            SearchOptions {
                label_capacity: 2,
                ..SearchOptions::default()
            },
        );

        assert!(matches!(
            planner.search(&request),
            Err(SearchError::Incomplete { .. })
        ));
    }

    #[test]
    fn no_route_is_a_legitimate_empty_result() {
        let (cal, _) = daily_calendar();
        let b = NetworkBuilder::new(2);
        let net = b.build();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        let request = SearchRequest::new(NodeId(0), vec![NodeId(1)], at(0));
        let result = planner.search(&request).unwrap();
        assert!(result.solutions.is_empty());
        assert_eq!(result.visited_nodes, 1);
    }

    #[test]
    fn configuration_errors_are_rejected_upfront() {
        let (cal, _) = daily_calendar();
        let net = NetworkBuilder::new(2).build();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        let no_targets = SearchRequest::new(NodeId(0), vec![], at(0));
        assert_eq!(planner.search(&no_targets), Err(SearchError::NoTargets));

        let bad_source = SearchRequest::new(NodeId(9), vec![NodeId(1)], at(0));
        assert_eq!(
            planner.search(&bad_source),
            Err(SearchError::SourceOutOfRange(NodeId(9)))
        );

        let bad_target = SearchRequest::new(NodeId(0), vec![NodeId(1), NodeId(9)], at(0));
        assert_eq!(
            planner.search(&bad_target),
            Err(SearchError::TargetOutOfRange(NodeId(9)))
        );

        let zero_budget = SearchRequest::new(NodeId(0), vec![NodeId(1)], at(0)).with_options(
            SearchOptions {
                node_budget: 0,
                ..SearchOptions::default()
            },
        );
        assert_eq!(planner.search(&zero_budget), Err(SearchError::ZeroNodeBudget));

        let zero_capacity = SearchRequest::new(NodeId(0), vec![NodeId(1)], at(0)).with_options(
            SearchOptions {
                label_capacity: 0,
                ..SearchOptions::default()
            },
        );
        assert_eq!(
            planner.search(&zero_capacity),
            Err(SearchError::ZeroLabelCapacity)
        );
    }

    #[test]
    fn source_equal_to_target_is_a_solution() {
        let (cal, _) = daily_calendar();
        let net = NetworkBuilder::new(1).build();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        let request = SearchRequest::new(NodeId(0), vec![NodeId(0)], at(42));
        let result = planner.search(&request).unwrap();

        assert_eq!(result.solutions.len(), 1);
        assert_eq!(result.solutions[0].time, at(42));
        assert_eq!(result.solutions[0].transfers, 0);
        assert!(result.solutions[0].edges.is_empty());
    }

    #[test]
    fn point_query_stops_at_the_cutoff() {
        let (cal, daily) = daily_calendar();
        let mut b = NetworkBuilder::new(6);
        b.add_edge(|id| Edge::board(id, NodeId(0), NodeId(1), tod(100), daily));
        b.add_edge(|id| Edge::alight(id, NodeId(1), NodeId(2), tod(200), daily));
        // A slow zero-transfer branch: not dominated by the scheduled
        // solution, so only the frontier cutoff can stop it.
        b.add_edge(|id| Edge::street(id, NodeId(0), NodeId(3), 1_000_000));
        b.add_edge(|id| Edge::street(id, NodeId(3), NodeId(4), 10_000));
        b.add_edge(|id| Edge::street(id, NodeId(4), NodeId(5), 10_000));
        let net = b.build();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        let request = SearchRequest::new(NodeId(0), vec![NodeId(2)], at(50));
        let result = planner.search(&request).unwrap();

        assert_eq!(result.solutions.len(), 1);
        // Root, the boarding and the solution expand; the walk label at
        // node 3 pops beyond the worst surviving solution and stops the
        // search before node 4 is ever labelled.
        assert_eq!(result.visited_nodes, 3);
    }

    #[test]
    fn point_mode_keeps_the_pareto_pair() {
        let (cal, daily) = daily_calendar();
        let mut b = NetworkBuilder::new(3);
        b.add_edge(|id| Edge::street(id, NodeId(0), NodeId(2), 1_000_000));
        b.add_edge(|id| Edge::board(id, NodeId(0), NodeId(1), tod(100), daily));
        b.add_edge(|id| Edge::alight(id, NodeId(1), NodeId(2), tod(200), daily));
        let net = b.build();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        let request = SearchRequest::new(NodeId(0), vec![NodeId(2)], at(0));
        let result = planner.search(&request).unwrap();

        // The scheduled journey is faster but boards; the walk is slower
        // with zero transfers. Neither dominates the other.
        assert_eq!(result.solutions.len(), 2);
        let walk = result
            .solutions
            .iter()
            .find(|s| s.first_departure.is_none())
            .unwrap();
        let scheduled = result
            .solutions
            .iter()
            .find(|s| s.first_departure.is_some())
            .unwrap();
        assert_eq!(walk.time, at(1000));
        assert_eq!(walk.transfers, 0);
        assert_eq!(scheduled.time, at(200));
        assert_eq!(scheduled.transfers, 1);
    }

    #[test]
    fn faster_walk_dominates_scheduled_in_point_mode() {
        let (cal, daily) = daily_calendar();
        let mut b = NetworkBuilder::new(3);
        b.add_edge(|id| Edge::street(id, NodeId(0), NodeId(2), 100_000));
        b.add_edge(|id| Edge::board(id, NodeId(0), NodeId(1), tod(300), daily));
        b.add_edge(|id| Edge::alight(id, NodeId(1), NodeId(2), tod(400), daily));
        let net = b.build();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        let request = SearchRequest::new(NodeId(0), vec![NodeId(2)], at(0));
        let result = planner.search(&request).unwrap();

        // The walk arrives earlier with fewer transfers; in point mode the
        // scheduled alternative is dominated outright.
        assert_eq!(result.solutions.len(), 1);
        assert!(result.solutions[0].first_departure.is_none());
    }

    #[test]
    fn profile_query_keeps_walk_and_later_departure() {
        init_tracing();
        let (cal, daily) = daily_calendar();
        let mut b = NetworkBuilder::new(5);
        b.add_edge(|id| Edge::street(id, NodeId(0), NodeId(2), 100_000));
        b.add_edge(|id| Edge::board(id, NodeId(0), NodeId(1), tod(300), daily));
        b.add_edge(|id| Edge::alight(id, NodeId(1), NodeId(2), tod(400), daily));
        // A departure past walk_time + window: its bucket shields it from
        // every solution, so only the closure bound can cut it off.
        b.add_edge(|id| Edge::board(id, NodeId(0), NodeId(3), tod(4000), daily));
        b.add_edge(|id| Edge::street(id, NodeId(3), NodeId(4), 10_000));
        let net = b.build();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        let request = SearchRequest::new(NodeId(0), vec![NodeId(2)], at(0)).with_options(
            SearchOptions {
                mode: QueryMode::Profile,
                max_profile_window_mins: 60,
                ..SearchOptions::default()
            },
        );
        let result = planner.search(&request).unwrap();

        // Both the walk (valid at any departure) and the later scheduled
        // journey survive.
        assert_eq!(result.solutions.len(), 2);
        assert_eq!(result.solutions[0].first_departure, None);
        assert_eq!(result.solutions[0].time, at(100));
        assert_eq!(result.solutions[1].first_departure, Some(at(300)));
        assert_eq!(result.solutions[1].time, at(400));

        // The walk solution closes the window at 100s + 3600s; the 4000s
        // departure is popped but never expanded, so node 4 stays untouched.
        assert_eq!(result.visited_nodes, 4);
    }

    #[test]
    fn profile_respects_the_solution_limit() {
        let (cal, daily) = daily_calendar();
        let mut b = NetworkBuilder::new(7);
        // Three departures to the same target, each later than the last.
        for (i, dep) in [(1u32, 100i64), (2, 200), (3, 300)] {
            let platform = NodeId(i);
            b.add_edge(|id| Edge::board(id, NodeId(0), platform, tod(dep), daily));
            b.add_edge(|id| Edge::alight(id, platform, NodeId(6), tod(dep + 50), daily));
        }
        let net = b.build();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        let request = SearchRequest::new(NodeId(0), vec![NodeId(6)], at(0)).with_options(
            SearchOptions {
                mode: QueryMode::Profile,
                limit_solutions: 2,
                ..SearchOptions::default()
            },
        );
        let result = planner.search(&request).unwrap();

        assert_eq!(result.solutions.len(), 2);
        assert_eq!(result.solutions[0].first_departure, Some(at(100)));
        assert_eq!(result.solutions[1].first_departure, Some(at(200)));
    }

    #[test]
    fn duplicate_candidates_are_rejected_once() {
        let (cal, daily) = daily_calendar();
        let mut b = NetworkBuilder::new(3);
        // Two identical departures on parallel edges.
        b.add_edge(|id| Edge::board(id, NodeId(0), NodeId(1), tod(100), daily));
        b.add_edge(|id| Edge::board(id, NodeId(0), NodeId(1), tod(100), daily));
        b.add_edge(|id| Edge::alight(id, NodeId(1), NodeId(2), tod(200), daily));
        let net = b.build();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        let request = SearchRequest::new(NodeId(0), vec![NodeId(2)], at(0));
        let result = planner.search(&request).unwrap();

        assert_eq!(result.solutions.len(), 1);
        // Root, the single surviving boarding, and the solution label: had
        // the duplicate been admitted there would be a fourth expansion.
        assert_eq!(result.visited_nodes, 3);
    }

    #[test]
    fn enter_and_leave_schedule_end_to_end() {
        let (cal, daily) = daily_calendar();
        let mut b = NetworkBuilder::new(5);
        b.add_edge(|id| Edge::enter_schedule(id, NodeId(0), NodeId(1), tod(100)));
        b.add_edge(|id| Edge::board(id, NodeId(1), NodeId(2), tod(100), daily));
        b.add_edge(|id| Edge::dwell(id, NodeId(2), NodeId(3), 100_000));
        b.add_edge(|id| Edge::leave_schedule(id, NodeId(3), NodeId(4), tod(200)));
        let net = b.build();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        let request = SearchRequest::new(NodeId(0), vec![NodeId(4)], at(50));
        let result = planner.search(&request).unwrap();

        assert_eq!(result.solutions.len(), 1);
        let solution = &result.solutions[0];
        assert_eq!(solution.time, at(200));
        assert_eq!(solution.transfers, 1);
        assert_eq!(solution.first_departure, Some(at(100)));
        assert_eq!(
            solution.edges,
            vec![EdgeId(0), EdgeId(1), EdgeId(2), EdgeId(3)]
        );
    }

    #[test]
    fn blocked_edges_change_the_result() {
        let (net, cal) = board_alight_network();
        let request = SearchRequest::new(NodeId(0), vec![NodeId(2)], at(50));

        let open = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &open);
        assert_eq!(planner.search(&request).unwrap().solutions.len(), 1);

        // A snapshot with the board edge blocked; the same network and
        // calendar serve both planners untouched.
        let blocked = RealtimeOverlay::from_blocked([EdgeId(0)]);
        let planner = Planner::new(&net, &cal, &blocked);
        assert!(planner.search(&request).unwrap().solutions.is_empty());
    }

    #[test]
    fn reverse_query_mirrors_the_forward_one() {
        let (net, cal) = board_alight_network();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        let forward = SearchRequest::new(NodeId(0), vec![NodeId(2)], at(50));
        let forward_result = planner.search(&forward).unwrap();

        let reverse = SearchRequest::new(NodeId(2), vec![NodeId(0)], at(250)).with_options(
            SearchOptions {
                direction: Direction::Reverse,
                ..SearchOptions::default()
            },
        );
        let reverse_result = planner.search(&reverse).unwrap();

        assert_eq!(forward_result.solutions.len(), 1);
        assert_eq!(reverse_result.solutions.len(), 1);
        let fwd = &forward_result.solutions[0];
        let rev = &reverse_result.solutions[0];

        // Same journey, described from the other end: equal durations,
        // transfers and edge sequence.
        let fwd_duration = fwd.time.signed_duration_since(at(50));
        let rev_duration = at(250).signed_duration_since(rev.time);
        assert_eq!(fwd_duration, rev_duration);
        assert_eq!(fwd.transfers, rev.transfers);
        assert_eq!(fwd.edges, rev.edges);
        assert_eq!(rev.time, at(100));
    }

    #[test]
    fn concurrent_queries_share_the_collaborators() {
        let (net, cal) = board_alight_network();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        let baseline = planner
            .search(&SearchRequest::new(NodeId(0), vec![NodeId(2)], at(50)))
            .unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        planner
                            .search(&SearchRequest::new(NodeId(0), vec![NodeId(2)], at(50)))
                            .unwrap()
                    })
                })
                .collect();
            for handle in handles {
                let result = handle.join().unwrap();
                assert_eq!(result.solutions, baseline.solutions);
            }
        });
    }

    #[test]
    fn dominated_candidate_is_not_reinserted() {
        let (cal, _) = daily_calendar();
        let mut b = NetworkBuilder::new(4);
        b.add_edge(|id| Edge::street(id, NodeId(0), NodeId(1), 10_000));
        b.add_edge(|id| Edge::street(id, NodeId(0), NodeId(2), 100_000));
        b.add_edge(|id| Edge::street(id, NodeId(2), NodeId(1), 100_000));
        let net = b.build();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        // Node 3 is unreachable, so the frontier drains completely. The
        // detour's label at node 1 is dominated by the direct walk and never
        // enters the set or the frontier: only root, node 1 and node 2
        // expand.
        let request = SearchRequest::new(NodeId(0), vec![NodeId(3)], at(0));
        let result = planner.search(&request).unwrap();
        assert!(result.solutions.is_empty());
        assert_eq!(result.visited_nodes, 3);
    }

    #[test]
    fn multiple_targets_collect_into_one_front() {
        let (cal, daily) = daily_calendar();
        let mut b = NetworkBuilder::new(4);
        b.add_edge(|id| Edge::street(id, NodeId(0), NodeId(1), 50_000));
        b.add_edge(|id| Edge::board(id, NodeId(0), NodeId(2), tod(100), daily));
        b.add_edge(|id| Edge::alight(id, NodeId(2), NodeId(3), tod(200), daily));
        let net = b.build();
        let rt = RealtimeOverlay::empty();
        let planner = Planner::new(&net, &cal, &rt);

        // Solutions at different targets share one front: the walk to node 1
        // arrives earlier with fewer transfers and dominates the scheduled
        // journey to node 3.
        let request = SearchRequest::new(NodeId(0), vec![NodeId(1), NodeId(3)], at(0));
        let result = planner.search(&request).unwrap();

        assert_eq!(result.solutions.len(), 1);
        assert_eq!(result.solutions[0].node, NodeId(1));
    }
}
