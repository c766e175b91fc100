//! Knobs for a maze session

use std::time::Duration;

use crate::error::MazeError;

/// Settings for one maze session.
///
/// Passed by value to [crate::Game::new]; the game never changes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Grid row count
    pub rows: usize,
    /// Grid column count
    pub columns: usize,
    /// How many monsters to place once the maze is carved
    pub monsters: usize,
    /// Delay between monster ticks
    pub speed: Duration,
    /// Minimum Manhattan distance between start and finish
    pub min_start_distance: usize,
    /// Carve one cell per generation tick instead of the whole maze at once
    pub slow: bool,
    /// Random seed, entropy is used when absent
    pub seed: Option<u64>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::square(40)
    }
}

impl Configuration {
    /// Default configuration on a `rows` x `rows` grid
    pub fn square(rows: usize) -> Self {
        Self {
            rows,
            columns: rows,
            monsters: 10,
            speed: Duration::from_millis(250),
            min_start_distance: 16,
            slow: true,
            seed: None,
        }
    }

    /// Largest start-finish distance the grid can offer
    pub fn max_start_distance(&self) -> usize {
        self.rows.saturating_sub(1) + self.columns.saturating_sub(1)
    }

    /// Check that a maze can be built from these settings.
    ///
    /// Finish placement resamples until the distance requirement is met, so a
    /// requirement larger than the grid diagonal is rejected up front.
    pub fn validate(&self) -> Result<(), MazeError> {
        match self.rows.checked_mul(self.columns) {
            None => {
                return Err(MazeError::GridTooLarge {
                    rows: self.rows,
                    columns: self.columns,
                })
            }
            Some(cells) if cells < 2 => {
                return Err(MazeError::GridTooSmall {
                    rows: self.rows,
                    columns: self.columns,
                })
            }
            Some(_) => (),
        }
        let max = self.max_start_distance();
        if self.min_start_distance > max {
            return Err(MazeError::UnreachableStartDistance {
                requested: self.min_start_distance,
                max,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_table() {
        let config = Configuration::default();
        assert_eq!(config.rows, 40);
        assert_eq!(config.columns, 40);
        assert_eq!(config.monsters, 10);
        assert_eq!(config.speed, Duration::from_millis(250));
        assert_eq!(config.min_start_distance, 16);
        assert!(config.slow);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_single_cell() {
        let config = Configuration {
            min_start_distance: 0,
            ..Configuration::square(1)
        };
        assert_eq!(
            config.validate(),
            Err(MazeError::GridTooSmall {
                rows: 1,
                columns: 1
            })
        );
    }

    #[test]
    fn rejects_grid_too_large_to_count() {
        let config = Configuration {
            rows: usize::MAX,
            columns: 2,
            min_start_distance: 0,
            ..Configuration::default()
        };
        assert_eq!(
            config.validate(),
            Err(MazeError::GridTooLarge {
                rows: usize::MAX,
                columns: 2
            })
        );
    }

    #[test]
    fn rejects_unreachable_distance() {
        let config = Configuration::square(4);
        assert_eq!(
            config.validate(),
            Err(MazeError::UnreachableStartDistance {
                requested: 16,
                max: 6
            })
        );

        let config = Configuration {
            min_start_distance: 6,
            ..Configuration::square(4)
        };
        assert!(config.validate().is_ok());
    }
}
