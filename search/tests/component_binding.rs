//! Task binding, structural sharing, and the iterated controller.

mod common;

use std::rc::Rc;

use common::{validate_plan, ScriptedEstimator, ScriptedFactory, TaskBuilder};

use foray_search::component::{
    build_search_engine, ComponentMap, EagerFactory, EvaluatorFactory, OpenListFactory,
    SearchEngineFactory,
};
use foray_search::engine::{SearchEngine, SearchStatus};
use foray_search::iterated::{IteratedSearch, IteratedSearchOptions};

/// start→a→goal (cost 5+1), start→b→a (cost 1+1): optimal 3 via b.
fn diamond() -> Rc<foray_task::task::PlanningTask> {
    TaskBuilder::new()
        .var(4)
        .goal(0, 3)
        .op("start-to-a", &[(0, 0)], &[(0, 1)], 5)
        .op("start-to-b", &[(0, 0)], &[(0, 2)], 1)
        .op("b-to-a", &[(0, 2)], &[(0, 1)], 1)
        .op("a-to-goal", &[(0, 1)], &[(0, 3)], 1)
        .build()
}

fn single(evaluator: &Rc<EvaluatorFactory>) -> Rc<OpenListFactory> {
    Rc::new(OpenListFactory::BestFirst {
        evaluator: Rc::clone(evaluator),
        pref_only: false,
    })
}

#[test]
fn a_heuristic_shared_by_two_open_lists_is_one_instance() {
    let task = TaskBuilder::new()
        .var(3)
        .goal(0, 2)
        .op("one", &[(0, 0)], &[(0, 1)], 1)
        .op("two", &[(0, 1)], &[(0, 2)], 1)
        .build();

    let mut estimator = ScriptedEstimator::from_h("shared", |values| 2 - values[0]);
    estimator.path_dependent = true;
    let transitions = Rc::clone(&estimator.transitions_seen);
    let factory = ScriptedFactory::single(estimator);
    let builds = Rc::clone(&factory.builds);

    let h = Rc::new(EvaluatorFactory::Heuristic {
        factory: Box::new(factory),
        cache_estimates: true,
    });
    let open_list = Rc::new(OpenListFactory::Alternation {
        sublists: vec![single(&h), single(&h)],
        boost: 0,
    });
    let engine_factory = Rc::new(SearchEngineFactory::Eager(EagerFactory::new(open_list)));

    engine_factory.validate(&task).expect("valid configuration");
    let mut map = ComponentMap::new(Rc::clone(&task));
    let mut engine = build_search_engine(&engine_factory, &mut map, 0);

    assert_eq!(engine.search(), SearchStatus::Solved);
    assert_eq!(builds.get(), 1, "two references, one task-specific instance");
    assert_eq!(
        transitions.get(),
        engine.statistics().generated(),
        "the shared instance sees each generated transition exactly once"
    );
}

#[test]
fn iterated_search_tightens_the_bound_between_phases() {
    let task = diamond();

    // Phase 1: greedy best-first under a misleading h finds the cost-6
    // plan through a.
    let greedy = ScriptedEstimator::from_h("greedy", |values| match values[0] {
        0 => 2,
        1 => 1,
        2 => 5,
        _ => 0,
    });
    let h = Rc::new(EvaluatorFactory::Heuristic {
        factory: Box::new(ScriptedFactory::single(greedy)),
        cache_estimates: true,
    });
    let phase1 = Rc::new(SearchEngineFactory::Eager(EagerFactory::new(single(&h))));

    // Phase 2: uniform-cost with reopening, which must beat the bound of 6.
    let g = Rc::new(EvaluatorFactory::G);
    let mut eager2 = EagerFactory::new(single(&g));
    eager2.reopen_closed = true;
    let phase2 = Rc::new(SearchEngineFactory::Eager(eager2));

    let mut engine = IteratedSearch::new(
        Rc::clone(&task),
        vec![phase1, phase2],
        IteratedSearchOptions::default(),
    );

    assert_eq!(engine.search(), SearchStatus::Solved);
    let plans = engine.found_plans();
    assert_eq!(plans.len(), 2, "both phases found (improving) plans");
    assert_eq!(plans[0].1, 6);
    assert_eq!(plans[1].1, 3);
    assert_eq!(validate_plan(&task, &plans[1].0), 3);
    assert_eq!(
        engine.plan().map(Vec::len),
        Some(3),
        "best plan is the three-step route"
    );
    assert!(engine.statistics().expanded() > 0, "statistics accumulate");
}

#[test]
fn iterated_phases_share_the_component_map() {
    let task = diamond();

    // One prepared estimator: if the second phase rebuilt the heuristic,
    // the factory would run dry and panic.
    let estimator = ScriptedEstimator::from_h("counted", |values| match values[0] {
        3 => 0,
        _ => 1,
    });
    let factory = ScriptedFactory::single(estimator);
    let builds = Rc::clone(&factory.builds);
    let h = Rc::new(EvaluatorFactory::Heuristic {
        factory: Box::new(factory),
        cache_estimates: true,
    });

    let phase = || Rc::new(SearchEngineFactory::Eager(EagerFactory::new(single(&h))));
    let mut engine = IteratedSearch::new(
        Rc::clone(&task),
        vec![phase(), phase()],
        IteratedSearchOptions::default(),
    );

    // Phase 1 solves at cost 6; phase 2 reruns the same configuration
    // under bound 6 and fails to improve, so iteration stops with the
    // phase-1 plan.
    assert_eq!(engine.search(), SearchStatus::Solved);
    assert_eq!(builds.get(), 1, "the heuristic was built once for both phases");
    assert_eq!(engine.found_plans().len(), 1);
}

#[test]
fn iterated_repeat_last_stops_after_a_failed_repeat() {
    let task = diamond();
    let g = Rc::new(EvaluatorFactory::G);
    let mut eager = EagerFactory::new(single(&g));
    eager.reopen_closed = true;
    let phase = Rc::new(SearchEngineFactory::Eager(eager));

    let options = IteratedSearchOptions {
        repeat_last: true,
        ..IteratedSearchOptions::default()
    };
    let mut engine = IteratedSearch::new(Rc::clone(&task), vec![phase], options);

    // Run 1 finds cost 3; the repeat under bound 3 fails; the controller
    // stops rather than repeating a deterministic failure.
    assert_eq!(engine.search(), SearchStatus::Solved);
    assert_eq!(engine.found_plans().len(), 1);
    assert_eq!(engine.found_plans()[0].1, 3);
}
