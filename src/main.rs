//! Bussi Runner entry point
//!
//! The playable build targets the browser; this native binary runs a
//! headless scripted session against an offline leaderboard so the whole
//! loop (run, death, initials, panel, restart) can be exercised from the
//! command line.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use bussi_runner::SessionPhase;
    use bussi_runner::consts::*;
    use bussi_runner::leaderboard::OfflineService;
    use bussi_runner::session::{InitialsKey, Session};
    use bussi_runner::sim::FrameInput;

    env_logger::init();
    log::info!("Bussi Runner (native) starting headless session");

    const DT: f32 = 1.0 / 60.0;
    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 120;

    let mut session = Session::new(0xB055, 0.0, OfflineService);
    let mut now = 0.0;

    for _ in 0..MAX_FRAMES {
        now += FRAME_MS;
        let input = FrameInput {
            jump_pressed: should_jump(&session),
            ..Default::default()
        };
        session.frame(&input, now, DT);

        if matches!(session.phase(), SessionPhase::EnteringInitials { .. }) {
            for c in ['b', 'o', 't'] {
                session.initials_key(InitialsKey::Letter(c));
            }
            session.initials_key(InitialsKey::Confirm);
        }

        if let SessionPhase::ShowingPanel { top } = session.phase() {
            println!("final score: {}", session.score());
            println!("top scores:");
            for (rank, entry) in top.iter().enumerate() {
                println!("  {}. {:<6} {}", rank + 1, entry.initials, entry.score);
            }
            return;
        }
    }

    println!("survived {MAX_FRAMES} frames at score {}", session.score());

    /// Jump once the nearest obstacle gets close
    fn should_jump(session: &Session<OfflineService>) -> bool {
        let state = session.state();
        let Some(player) = state.player.as_ref() else {
            return false;
        };
        if !player.on_ground {
            return false;
        }
        // Lead distance scales with speed so faster runs still clear
        let lead = state.player_speed * 0.55;
        state
            .obstacles
            .iter()
            .any(|o| o.x > player.pos.x && o.x - player.pos.x < lead + PLAYER_WIDTH)
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm entry point lives in the host page glue, not here
}
