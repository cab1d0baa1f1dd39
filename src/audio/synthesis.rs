//! Built-in Glicol composition played when no track is given.

use glicol::Engine;

use crate::params::audio_constants::BLOCK_SIZE;

/// Glicol composition (procedural music code)
pub const GLICOL_COMPOSITION: &str = r#"
~gate: speed 4.0 >> seq 60 _60 _~a 48
~a: choose 48 48 55 60 72 0 0
~amp: ~gate >> envperc 0.002 0.2
~pit: ~gate >> mul 130.81
~bass: saw ~pit >> mul ~amp >> lpf ~mod 3.0 >> mul 0.2
~mod: sin 0.3 >> mul 900 >> add 1100
o: ~bass >> plate 0.1
"#;

/// Create an engine running the composition at `sample_rate`
pub fn build_engine(sample_rate: usize) -> Result<Engine<BLOCK_SIZE>, String> {
    let mut engine = Engine::<BLOCK_SIZE>::new();
    engine.set_sr(sample_rate);
    engine.update_with_code(GLICOL_COMPOSITION);
    engine
        .update()
        .map_err(|e| format!("Glicol engine init failed: {:?}", e))?;
    Ok(engine)
}
