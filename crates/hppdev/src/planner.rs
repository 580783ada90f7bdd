//! Planner capability
//!
//! Algorithm packages plug into the framework by implementing [`Planner`]:
//! robots and obstacles are registered first, then `solve` is called.
//! [`PlanningProblem`] keeps the registrations so implementations only
//! have to provide the solving part.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlannerError {
    #[error("No robot registered")]
    NoRobot,

    #[error("Robot already registered: {0}")]
    DuplicateRobot(String),

    #[error("Obstacle already registered: {0}")]
    DuplicateObstacle(String),

    #[error("No solution found for robot {robot}: {reason}")]
    Unsolved { robot: String, reason: String },
}

/// A robot handed to a planner, identified by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    pub name: String,
    /// Number of configuration parameters
    pub dof: usize,
    pub init: Vec<f64>,
    pub goal: Vec<f64>,
}

/// A named obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub name: String,
}

/// A path per robot, as a sequence of configurations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Solution {
    pub paths: Vec<(String, Vec<Vec<f64>>)>,
}

/// Robots and obstacles registered with a planner
#[derive(Debug, Clone, Default)]
pub struct PlanningProblem {
    robots: Vec<Robot>,
    obstacles: Vec<Obstacle>,
}

impl PlanningProblem {
    pub fn add_robot(&mut self, robot: Robot) -> Result<(), PlannerError> {
        if self.robots.iter().any(|r| r.name == robot.name) {
            return Err(PlannerError::DuplicateRobot(robot.name));
        }
        self.robots.push(robot);
        Ok(())
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) -> Result<(), PlannerError> {
        if self.obstacles.iter().any(|o| o.name == obstacle.name) {
            return Err(PlannerError::DuplicateObstacle(obstacle.name));
        }
        self.obstacles.push(obstacle);
        Ok(())
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }
}

/// Capability set every planning algorithm exposes
pub trait Planner {
    /// Registered robots and obstacles
    fn problem(&self) -> &PlanningProblem;

    fn problem_mut(&mut self) -> &mut PlanningProblem;

    /// Compute a path for every registered robot
    fn solve(&mut self) -> Result<Solution, PlannerError>;

    fn add_robot(&mut self, robot: Robot) -> Result<(), PlannerError> {
        self.problem_mut().add_robot(robot)
    }

    fn add_obstacle(&mut self, obstacle: Obstacle) -> Result<(), PlannerError> {
        self.problem_mut().add_obstacle(obstacle)
    }

    /// Check the problem is ready to be solved
    fn setup(&self) -> Result<(), PlannerError> {
        if self.problem().robots().is_empty() {
            return Err(PlannerError::NoRobot);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Joins init and goal directly, refusing when obstacles are present
    #[derive(Default)]
    struct DirectPlanner {
        problem: PlanningProblem,
    }

    impl Planner for DirectPlanner {
        fn problem(&self) -> &PlanningProblem {
            &self.problem
        }

        fn problem_mut(&mut self) -> &mut PlanningProblem {
            &mut self.problem
        }

        fn solve(&mut self) -> Result<Solution, PlannerError> {
            self.setup()?;
            let mut solution = Solution::default();
            for robot in self.problem.robots() {
                if !self.problem.obstacles().is_empty() {
                    return Err(PlannerError::Unsolved {
                        robot: robot.name.clone(),
                        reason: "obstacles present".to_string(),
                    });
                }
                solution
                    .paths
                    .push((robot.name.clone(), vec![robot.init.clone(), robot.goal.clone()]));
            }
            Ok(solution)
        }
    }

    fn robot(name: &str) -> Robot {
        Robot {
            name: name.to_string(),
            dof: 2,
            init: vec![0.0, 0.0],
            goal: vec![1.0, 1.0],
        }
    }

    #[test]
    fn test_solve_requires_robot() {
        let mut planner = DirectPlanner::default();
        assert_eq!(planner.solve(), Err(PlannerError::NoRobot));
    }

    #[test]
    fn test_registration_and_solve() {
        let mut planner = DirectPlanner::default();
        planner.add_robot(robot("hrp2")).unwrap();
        assert_eq!(
            planner.add_robot(robot("hrp2")),
            Err(PlannerError::DuplicateRobot("hrp2".to_string()))
        );

        let solution = planner.solve().unwrap();
        assert_eq!(solution.paths.len(), 1);
        assert_eq!(solution.paths[0].1.last(), Some(&vec![1.0, 1.0]));

        planner
            .add_obstacle(Obstacle {
                name: "table".to_string(),
            })
            .unwrap();
        assert!(matches!(planner.solve(), Err(PlannerError::Unsolved { .. })));
    }
}
