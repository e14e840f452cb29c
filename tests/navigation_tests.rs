use mockall::mock;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rstest::rstest;
use semnav::core::{EpisodeOutcome, EpisodeState, Grid, Position};
use semnav::navigation::{COLLISION_REWARD, GOAL_REWARD, STEP_REWARD};
use semnav::{
    Action, ActionScorer, Cell, EpsilonGreedyPlanner, NavGrid, NavigationAgent, NavigationEnv,
    NavigationError,
};

mock! {
    Scorer {}
    impl ActionScorer for Scorer {
        fn score(&self, grid: &NavGrid) -> [f64; 4];
    }
}

fn env(size: usize, seed: u64) -> NavigationEnv {
    NavigationEnv::new(size, ChaCha8Rng::seed_from_u64(seed)).unwrap()
}

#[rstest]
fn random_reset_has_one_agent_and_one_goal(
    #[values(2, 3, 5, 10, 40)] size: usize,
    #[values(0, 1, 99)] seed: u64,
) {
    let mut env = env(size, seed);
    let grid = env.reset_random();
    assert_eq!(grid.count(Cell::Agent), 1);
    assert_eq!(grid.count(Cell::Goal), 1);
    assert_eq!(grid.get(0, 0), Some(Cell::Agent));
    assert_eq!(grid.get(size - 1, size - 1), Some(Cell::Goal));
    assert!(grid.count(Cell::Obstacle) <= 3 * size);
    assert_eq!(env.state(), EpisodeState::Ready);
}

#[rstest]
#[case(2)]
#[case(6)]
fn map_reset_has_one_agent_and_one_goal(#[case] size: usize) {
    // every cell occupied, including start and goal
    let occupancy = Grid::filled(size, 4u8);
    let grid = env(3, 0).reset_from_map(&occupancy).unwrap();
    assert_eq!(grid.count(Cell::Agent), 1);
    assert_eq!(grid.count(Cell::Goal), 1);
    assert_eq!(grid.count(Cell::Obstacle), size * size - 2);
}

#[rstest]
fn area_many_steps_always_end_the_episode(#[values(1, 2, 4, 7)] size: usize, #[values(3, 4)] seed: u64) {
    let mut env = env(size, seed);
    env.reset_random();
    let mut actions = ChaCha8Rng::seed_from_u64(seed + 100);
    loop {
        let action = Action::ALL[actions.gen_range(0..4)];
        if env.step(action).unwrap().done {
            break;
        }
        assert!(env.episode().steps < size * size);
    }
    assert!(env.episode().steps <= size * size);
    assert_eq!(env.state(), EpisodeState::Terminal);
    assert_eq!(env.step(Action::Up), Err(NavigationError::EpisodeFinished));
}

#[test]
fn moving_right_on_empty_grid() {
    let mut env = env(4, 0);
    env.reset_from_map(&Grid::filled(4, 0)).unwrap();
    assert_eq!(env.episode().goal, Position::new(3, 3));

    let out = env.step(Action::Right).unwrap();
    assert_eq!(out.reward, STEP_REWARD);
    assert!(!out.done);
    assert_eq!(env.episode().agent, Position::new(0, 1));
    assert_eq!(out.grid.get(0, 1), Some(Cell::Agent));
    assert_eq!(out.grid.get(0, 0), Some(Cell::Free));
}

#[rstest]
#[case(Action::Right, 0, 1)]
#[case(Action::Down, 1, 0)]
fn stepping_into_obstacle_ends_episode(#[case] action: Action, #[case] row: usize, #[case] col: usize) {
    let mut occupancy = Grid::filled(5, 0u8);
    occupancy.set(row, col, 2);
    let mut env = env(5, 0);
    env.reset_from_map(&occupancy).unwrap();

    let out = env.step(action).unwrap();
    assert_eq!(out.reward, COLLISION_REWARD);
    assert!(out.done);
    assert_eq!(out.grid.get(row, col), Some(Cell::Agent));
    assert_eq!(env.episode().outcome, Some(EpisodeOutcome::Collision));
}

#[test]
fn collision_late_in_episode_still_penalised() {
    let mut occupancy = Grid::filled(3, 0u8);
    occupancy.set(0, 1, 1);
    let mut env = env(3, 0);
    env.reset_from_map(&occupancy).unwrap();
    for _ in 0..7 {
        assert!(!env.step(Action::Up).unwrap().done);
    }
    let out = env.step(Action::Right).unwrap();
    assert_eq!(out.reward, COLLISION_REWARD);
    assert!(out.done);
}

#[test]
fn timeout_keeps_goal_reward() {
    // 2x2: the budget runs out on the same step the goal is reached
    let mut env = env(2, 0);
    env.reset_from_map(&Grid::filled(2, 0)).unwrap();
    env.step(Action::Up).unwrap();
    env.step(Action::Left).unwrap();
    env.step(Action::Right).unwrap();
    let out = env.step(Action::Down).unwrap();
    assert_eq!(out.reward, GOAL_REWARD);
    assert!(out.done);
    assert_eq!(env.episode().outcome, Some(EpisodeOutcome::ReachedGoal));
}

#[test]
fn agent_follows_injected_scores() {
    let mut scorer = MockScorer::new();
    scorer
        .expect_score()
        .withf(|grid: &NavGrid| grid.count(Cell::Agent) == 1)
        .returning(|_| [0.0, 0.3, 0.0, 0.3]);
    let planner = EpsilonGreedyPlanner::new(Box::new(scorer), ChaCha8Rng::seed_from_u64(5));
    let mut agent = NavigationAgent::new(env(4, 5), planner);
    agent.reset_from_map(&Grid::filled(4, 0)).unwrap();

    let summary = agent.run_episode(0.0).unwrap();
    // ties resolve to Down until the wall, then Down is a no-op until timeout
    assert_eq!(summary.outcome, EpisodeOutcome::TimedOut);
    assert_eq!(agent.episode().agent, Position::new(3, 0));
    assert_eq!(summary.steps, 16);
}
