use log::info;
use rayon::prelude::*;

use crate::battle::Match;
use crate::error::MatchError;
use crate::metrics::Standings;
use crate::program::Program;
use crate::settings::Settings;

/// Configuration for a series of rounds between the same two programs.
pub struct TournamentConfig {
    /// Settings shared by every round; each round replaces the seed.
    pub settings: Settings,
    /// Number of independent matches.
    pub rounds: usize,
    /// Round `i` is seeded with `seed + i`.
    pub seed: u64,
}

/// Run every round as its own match, in parallel.
///
/// Rounds share nothing mutable, so the outcome depends only on the
/// configuration, not on how rayon schedules them.
pub fn run_tournament(
    config: &TournamentConfig,
    a: &Program,
    b: &Program,
) -> Result<Standings, MatchError> {
    // Surface configuration problems once instead of per round.
    Match::new(config.settings.clone(), a, b)?;

    let standings = (0..config.rounds)
        .into_par_iter()
        .map(|round| -> Result<Standings, MatchError> {
            let settings = config.settings.with_seed(config.seed.wrapping_add(round as u64));
            let verdict = Match::new(settings, a, b)?.run().verdict;
            Ok(std::iter::once(verdict).collect())
        })
        .try_reduce(Standings::default, |x, y| Ok(x.merge(y)))?;

    info!("{} rounds: {standings}", config.rounds);
    Ok(standings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Player;
    use crate::warriors;

    #[test]
    fn test_every_round_counted() {
        let config = TournamentConfig {
            settings: Settings {
                maximum_ticks: 500,
                ..Default::default()
            },
            rounds: 16,
            seed: 7,
        };
        let standings =
            run_tournament(&config, &warriors::imp(), &warriors::sitting_duck()).unwrap();
        assert_eq!(standings.rounds(), 16);
        assert_eq!(standings.wins(Player::A), 16);
    }

    #[test]
    fn test_deterministic_with_random_separation() {
        let config = TournamentConfig {
            settings: Settings {
                maximum_ticks: 2000,
                random_separation: true,
                minimum_separation: 100,
                separation: 1800,
                ..Default::default()
            },
            rounds: 24,
            seed: 42,
        };
        let run = || run_tournament(&config, &warriors::dwarf(), &warriors::imp()).unwrap();
        assert_eq!(run(), run());
    }

    #[test]
    fn test_invalid_settings_rejected_up_front() {
        let config = TournamentConfig {
            settings: Settings {
                core_size: 0,
                ..Default::default()
            },
            rounds: 4,
            seed: 0,
        };
        assert!(run_tournament(&config, &warriors::imp(), &warriors::imp()).is_err());
    }

    #[test]
    fn test_zero_rounds() {
        let config = TournamentConfig {
            settings: Settings::default(),
            rounds: 0,
            seed: 0,
        };
        let standings = run_tournament(&config, &warriors::imp(), &warriors::imp()).unwrap();
        assert_eq!(standings, Standings::default());
    }
}
