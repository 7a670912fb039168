use log::{debug, info};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::error::MatchError;
use crate::memory::Core;
use crate::process::Player;
use crate::program::Program;
use crate::scheduler::{Scheduler, Step};
use crate::settings::Settings;
use crate::trace::{CellWrite, StepKind, Trace, TraceEntry};

/// How a match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Win(Player),
    Draw,
}

/// Everything a finished match produces.
#[derive(Clone, Debug)]
pub struct MatchResult {
    pub verdict: Verdict,
    /// Full ticks executed.
    pub ticks: usize,
    /// Load addresses of player A and player B.
    pub bases: [usize; 2],
    /// Empty unless the match was built with [`Match::with_trace`].
    pub trace: Trace,
    /// The core as the match left it.
    pub core: Core,
}

/// A battle between two programs in one core.
///
/// A tick runs player A's next process and then player B's. After each
/// tick the match ends if either queue is empty (both empty is a draw) or
/// the tick limit has been reached (a draw).
pub struct Match {
    settings: Settings,
    core: Core,
    scheduler: Scheduler,
    bases: [usize; 2],
    ticks: usize,
    trace: Option<Trace>,
    verdict: Option<Verdict>,
}

impl Match {
    /// Validate the settings and programs, then load both programs.
    ///
    /// Player A loads at address 0 and player B after the gap the settings
    /// select past A's last instruction. The way back around the ring from
    /// B's last instruction to A must leave at least the minimum separation.
    pub fn new(settings: Settings, a: &Program, b: &Program) -> Result<Self, MatchError> {
        settings.validate()?;
        check_program(Player::A, a)?;
        check_program(Player::B, b)?;

        let gap = separation(&settings);
        if a.len() + gap + b.len() + settings.minimum_separation > settings.core_size {
            return Err(MatchError::ProgramsOverlap {
                len_a: a.len(),
                len_b: b.len(),
                gap,
                minimum: settings.minimum_separation,
                core_size: settings.core_size,
            });
        }

        let bases = [0, a.len() + gap];
        let mut core = Core::from_settings(&settings);
        core.load_program(bases[0], a.instructions());
        core.load_program(bases[1], b.instructions());
        // Loading is not part of any step.
        core.take_writes();

        let starts = [
            core.offset(bases[0], a.entry()),
            core.offset(bases[1], b.entry()),
        ];
        debug!(
            "loaded A ({} instructions) at {:05}, B ({} instructions) at {:05}",
            a.len(),
            bases[0],
            b.len(),
            bases[1]
        );
        let scheduler = Scheduler::new(starts, settings.maximum_processes_per_player);

        Ok(Self {
            settings,
            core,
            scheduler,
            bases,
            ticks: 0,
            trace: None,
            verdict: None,
        })
    }

    /// Record a trace entry for every executed instruction.
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(Trace::new());
        self
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn bases(&self) -> [usize; 2] {
        self.bases
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    /// Live processes of one player.
    pub fn processes(&self, player: Player) -> usize {
        self.scheduler.queue(player).len()
    }

    /// Run one tick, unless the match is already decided.
    ///
    /// Returns the verdict once there is one; after that, further calls
    /// execute nothing and keep returning it.
    pub fn tick(&mut self) -> Option<Verdict> {
        if self.verdict.is_some() {
            return self.verdict;
        }

        for player in Player::BOTH {
            if let Some(step) = self.scheduler.step(player, &mut self.core) {
                self.record(player, step);
            }
        }
        self.ticks += 1;

        let alive_a = self.scheduler.is_alive(Player::A);
        let alive_b = self.scheduler.is_alive(Player::B);
        self.verdict = match (alive_a, alive_b) {
            (false, false) => Some(Verdict::Draw),
            (true, false) => Some(Verdict::Win(Player::A)),
            (false, true) => Some(Verdict::Win(Player::B)),
            (true, true) if self.ticks >= self.settings.maximum_ticks => Some(Verdict::Draw),
            (true, true) => None,
        };
        if let Some(verdict) = self.verdict {
            info!("match decided after {} ticks: {verdict:?}", self.ticks);
        }
        self.verdict
    }

    /// Run to completion. Consumes the match: a finished match cannot be
    /// rerun, build a fresh one instead.
    pub fn run(mut self) -> MatchResult {
        let verdict = loop {
            if let Some(verdict) = self.tick() {
                break verdict;
            }
        };
        MatchResult {
            verdict,
            ticks: self.ticks,
            bases: self.bases,
            trace: self.trace.unwrap_or_default(),
            core: self.core,
        }
    }

    fn record(&mut self, player: Player, step: Step) {
        let writes = self.core.take_writes();
        let Some(trace) = self.trace.as_mut() else {
            return;
        };
        let writes = writes
            .into_iter()
            .map(|address| CellWrite {
                address,
                instruction: *self.core.cell(address),
            })
            .collect();
        trace.push(TraceEntry {
            tick: self.ticks,
            player,
            address: step.process.pc,
            instruction: step.instruction,
            kind: StepKind::from_outcome(step.outcome, step.spawned),
            writes,
            processes: self.scheduler.queue(player).len(),
        });
    }
}

/// Free cells between player A's last instruction and player B's first.
///
/// Fixed at `separation` unless `random_separation` is set, in which case
/// it is drawn from `minimum_separation..=separation` with a generator
/// seeded by `seed`.
pub fn separation(settings: &Settings) -> usize {
    if settings.random_separation {
        let mut rng = SmallRng::seed_from_u64(settings.seed);
        rng.gen_range(settings.minimum_separation..=settings.separation)
    } else {
        settings.separation
    }
}

fn check_program(player: Player, program: &Program) -> Result<(), MatchError> {
    if program.is_empty() {
        return Err(MatchError::EmptyProgram(player));
    }
    if program.entry() >= program.len() {
        return Err(MatchError::EntryOutOfRange {
            player,
            entry: program.entry(),
            len: program.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Retirement;
    use crate::error::ConfigError;
    use crate::instruction::{AddressMode, Instruction, Modifier, Opcode};

    fn ins(opcode: Opcode, a_mode: AddressMode, a: i64, b_mode: AddressMode, b: i64) -> Instruction {
        Instruction::with_default_modifier(opcode, a_mode, a, b_mode, b)
    }

    fn dat() -> Program {
        Program::new(vec![ins(Opcode::Dat, AddressMode::Direct, 0, AddressMode::Direct, 0)])
    }

    fn tiny_settings() -> Settings {
        Settings {
            core_size: 8,
            read_distance: 8,
            write_distance: 8,
            minimum_separation: 2,
            separation: 4,
            maximum_ticks: 100,
            ..Default::default()
        }
    }

    #[test]
    fn test_both_dat_is_draw_after_one_tick() {
        let result = Match::new(tiny_settings(), &dat(), &dat()).unwrap().run();
        assert_eq!(result.verdict, Verdict::Draw);
        assert_eq!(result.ticks, 1);
    }

    #[test]
    fn test_adder_beats_dat() {
        let adder = Program::new(vec![
            ins(Opcode::Add, AddressMode::Immediate, 4, AddressMode::Direct, 0),
            ins(Opcode::Jmp, AddressMode::Direct, -1, AddressMode::Direct, 0),
        ]);
        let mut game = Match::new(Settings::default(), &adder, &dat()).unwrap().with_trace();
        assert_eq!(game.tick(), Some(Verdict::Win(Player::A)));
        assert_eq!(game.processes(Player::B), 0);
        assert_eq!(game.processes(Player::A), 1);

        let result = game.run();
        assert_eq!(result.verdict, Verdict::Win(Player::A));
        assert_eq!(result.ticks, 1);
        assert_eq!(result.trace.len(), 2);
        let b_step = &result.trace.entries()[1];
        assert_eq!(b_step.player, Player::B);
        assert_eq!(
            b_step.kind,
            StepKind::Retired {
                reason: Retirement::Dat
            }
        );
        // ADD.AB #4, $0 grew its own B-field.
        assert_eq!(result.core.load(0).b_field, 4);
    }

    #[test]
    fn test_verdict_is_frozen() {
        let mut game = Match::new(tiny_settings(), &dat(), &dat()).unwrap();
        assert_eq!(game.tick(), Some(Verdict::Draw));
        let cells = game.core().cells().to_vec();
        assert_eq!(game.tick(), Some(Verdict::Draw));
        assert_eq!(game.ticks(), 1);
        assert_eq!(game.core().cells(), &cells[..]);
    }

    #[test]
    fn test_non_interfering_programs_draw_at_tick_limit() {
        let looper = Program::new(vec![ins(
            Opcode::Jmp,
            AddressMode::Direct,
            0,
            AddressMode::Direct,
            0,
        )]);
        let settings = Settings {
            maximum_ticks: 250,
            ..Default::default()
        };
        let result = Match::new(settings, &looper, &looper).unwrap().run();
        assert_eq!(result.verdict, Verdict::Draw);
        assert_eq!(result.ticks, 250);
        assert!(result.trace.is_empty());
    }

    #[test]
    fn test_trace_records_every_step_and_writes() {
        let imp = Program::new(vec![ins(
            Opcode::Mov,
            AddressMode::Direct,
            0,
            AddressMode::Direct,
            1,
        )]);
        let settings = Settings {
            maximum_ticks: 3,
            ..Default::default()
        };
        let result = Match::new(settings, &imp, &imp).unwrap().with_trace().run();
        assert_eq!(result.trace.len(), 6);
        let first = &result.trace.entries()[0];
        assert_eq!(first.tick, 0);
        assert_eq!(first.player, Player::A);
        assert_eq!(first.address, 0);
        assert_eq!(first.kind, StepKind::Continued { next: 1 });
        assert_eq!(first.writes.len(), 1);
        assert_eq!(first.writes[0].address, 1);
        assert_eq!(first.writes[0].instruction.opcode, Opcode::Mov);
        let last = result.trace.entries().last().unwrap();
        assert_eq!(last.tick, 2);
        assert_eq!(last.player, Player::B);
        // B loads 1024 cells past A's single instruction.
        assert_eq!(last.address, 1025 + 2);
    }

    #[test]
    fn test_dat_process_never_runs_again() {
        // A splits once into a DAT; the DAT process dies and A keeps looping.
        let splitter = Program::new(vec![
            ins(Opcode::Spl, AddressMode::Direct, 2, AddressMode::Direct, 0),
            ins(Opcode::Jmp, AddressMode::Direct, 0, AddressMode::Direct, 0),
            ins(Opcode::Dat, AddressMode::Direct, 0, AddressMode::Direct, 0),
        ]);
        let looper = Program::new(vec![ins(
            Opcode::Jmp,
            AddressMode::Direct,
            0,
            AddressMode::Direct,
            0,
        )]);
        let settings = Settings {
            maximum_ticks: 20,
            ..Default::default()
        };
        let result = Match::new(settings, &splitter, &looper)
            .unwrap()
            .with_trace()
            .run();
        assert_eq!(result.verdict, Verdict::Draw);
        let dat_steps = result
            .trace
            .for_player(Player::A)
            .filter(|e| e.address == 2)
            .count();
        assert_eq!(dat_steps, 1);
    }

    #[test]
    fn test_split_cap_in_match() {
        let bomb = Program::new(vec![
            ins(Opcode::Spl, AddressMode::Direct, 0, AddressMode::Direct, 0),
            ins(Opcode::Jmp, AddressMode::Direct, -1, AddressMode::Direct, 0),
        ]);
        let settings = Settings {
            maximum_ticks: 200,
            maximum_processes_per_player: 5,
            ..Default::default()
        };
        let mut game = Match::new(settings, &bomb, &bomb).unwrap();
        while game.tick().is_none() {
            assert!(game.processes(Player::A) <= 5);
            assert!(game.processes(Player::B) <= 5);
        }
        assert_eq!(game.processes(Player::A), 5);
        assert_eq!(game.verdict(), Some(Verdict::Draw));
    }

    #[test]
    fn test_division_by_zero_loses() {
        let divider = Program::new(vec![ins(
            Opcode::Div,
            AddressMode::Immediate,
            0,
            AddressMode::Direct,
            1,
        )]);
        let looper = Program::new(vec![ins(
            Opcode::Jmp,
            AddressMode::Direct,
            0,
            AddressMode::Direct,
            0,
        )]);
        let result = Match::new(Settings::default(), &divider, &looper)
            .unwrap()
            .run();
        assert_eq!(result.verdict, Verdict::Win(Player::B));
    }

    #[test]
    fn test_entry_offset() {
        let program = Program::new(vec![
            ins(Opcode::Dat, AddressMode::Direct, 0, AddressMode::Direct, 0),
            ins(Opcode::Jmp, AddressMode::Direct, 0, AddressMode::Direct, 0),
        ])
        .with_entry(1);
        let settings = Settings {
            maximum_ticks: 10,
            ..Default::default()
        };
        let result = Match::new(settings, &program, &dat()).unwrap().run();
        assert_eq!(result.verdict, Verdict::Win(Player::A));
    }

    #[test]
    fn test_rejects_bad_programs() {
        let empty = Program::new(Vec::new());
        assert_eq!(
            Match::new(Settings::default(), &empty, &dat()).err(),
            Some(MatchError::EmptyProgram(Player::A))
        );

        // 1 + 4 + 3 + 2 cells do not fit in 8.
        let long = Program::new(vec![Instruction::default(); 3]);
        assert_eq!(
            Match::new(tiny_settings(), &dat(), &long).err(),
            Some(MatchError::ProgramsOverlap {
                len_a: 1,
                len_b: 3,
                gap: 4,
                minimum: 2,
                core_size: 8,
            })
        );
        let fits = Program::new(vec![Instruction::default(); 1]);
        assert!(Match::new(tiny_settings(), &dat(), &fits).is_ok());

        let bad_entry = dat().with_entry(1);
        assert!(matches!(
            Match::new(Settings::default(), &bad_entry, &dat()).err(),
            Some(MatchError::EntryOutOfRange { player: Player::A, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_settings() {
        let settings = Settings {
            core_size: 0,
            ..Default::default()
        };
        assert_eq!(
            Match::new(settings, &dat(), &dat()).err(),
            Some(MatchError::Config(ConfigError::EmptyCore))
        );
    }

    #[test]
    fn test_fixed_separation() {
        let game = Match::new(Settings::default(), &dat(), &dat()).unwrap();
        assert_eq!(game.bases(), [0, 1025]);
    }

    fn lobby_settings() -> Settings {
        Settings {
            core_size: 2048,
            instruction_limit: 500,
            initial_instruction: Opcode::Add,
            maximum_ticks: 100_000,
            maximum_processes_per_player: 16,
            read_distance: 100,
            write_distance: 100,
            minimum_separation: 50,
            separation: 50,
            random_separation: true,
            seed: 0,
        }
    }

    #[test]
    fn test_programs_longer_than_separation_load_apart() {
        let nops = Program::new(vec![
            ins(Opcode::Nop, AddressMode::Direct, 0, AddressMode::Direct, 0);
            60
        ]);
        let game = Match::new(lobby_settings(), &nops, &nops).unwrap();
        assert_eq!(game.bases(), [0, 110]);
        assert_eq!(game.core().load(59).opcode, Opcode::Nop);
        assert_eq!(game.core().load(60).opcode, Opcode::Add);
        assert_eq!(game.core().load(109).opcode, Opcode::Add);
        assert_eq!(game.core().load(110).opcode, Opcode::Nop);
        assert_eq!(game.core().load(170).opcode, Opcode::Add);
    }

    #[test]
    fn test_programs_at_instruction_limit_fit() {
        let big = Program::new(vec![Instruction::default(); 500]);
        let game = Match::new(lobby_settings(), &big, &big).unwrap();
        assert_eq!(game.bases(), [0, 550]);
    }

    #[test]
    fn test_rejects_programs_that_wrap_into_each_other() {
        let huge = Program::new(vec![Instruction::default(); 1000]);
        assert!(matches!(
            Match::new(lobby_settings(), &huge, &huge).err(),
            Some(MatchError::ProgramsOverlap { gap: 50, .. })
        ));
    }

    #[test]
    fn test_random_separation_is_seeded_and_bounded() {
        let settings = Settings {
            random_separation: true,
            minimum_separation: 100,
            separation: 900,
            ..Default::default()
        };
        for seed in 0..50 {
            let s = settings.with_seed(seed);
            let offset = separation(&s);
            assert!((100..=900).contains(&offset));
            assert_eq!(offset, separation(&s));
        }
        let distinct: std::collections::HashSet<usize> =
            (0..50).map(|seed| separation(&settings.with_seed(seed))).collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn test_initial_instruction_fills_core() {
        let settings = Settings {
            initial_instruction: Opcode::Nop,
            ..Default::default()
        };
        let game = Match::new(settings, &dat(), &dat()).unwrap();
        assert_eq!(game.core().load(500).opcode, Opcode::Nop);
        assert_eq!(game.core().load(500).modifier, Modifier::F);
        assert_eq!(game.core().load(0).opcode, Opcode::Dat);
    }
}
