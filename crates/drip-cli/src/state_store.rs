// crates/drip-cli/src/state_store.rs
//
// JSON persistence of the engine snapshot between CLI invocations.

use std::fs;
use std::path::Path;

use drip_core::error::DripError;
use drip_economics::{DripEngine, EngineState, Token};

/// Engine over the in-memory reference tokens.
pub type Engine = DripEngine<Token, Token>;

/// Load the engine snapshot at `path`.
pub fn load(path: &str) -> Result<Engine, DripError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        DripError::Io(format!("Could not read state file {} ({}); run `drip init` first", path, e))
    })?;
    let state: EngineState<Token, Token> = serde_json::from_str(&contents)?;
    Ok(DripEngine::from_state(state))
}

/// Write the engine snapshot to `path`, creating parent directories.
///
/// The snapshot is written to a sibling temp file and renamed into place so
/// an interrupted write never truncates the previous state.
pub fn save(path: &str, engine: &Engine) -> Result<(), DripError> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(&engine.snapshot()?)?;
    let tmp = format!("{}.tmp", path);
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    tracing::debug!("Saved engine state to {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use drip_core::identity::{AccountId, Moment};
    use drip_economics::{Genesis, UNITS_PER_TOKEN};
    use uuid::Uuid;

    fn temp_state_path(label: &str) -> String {
        let dir = std::env::temp_dir();
        let path = dir
            .join(format!("drip_test_{}_{}", label, Uuid::now_v7()))
            .join("state.json");
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_state_path("roundtrip");
        let owner = AccountId::new("deployer");
        let mut genesis = Genesis::new(owner.clone());
        genesis.initial_lp_supply = 10 * UNITS_PER_TOKEN;
        genesis.drip_per_block = UNITS_PER_TOKEN / 100;
        let engine = DripEngine::bootstrap(&genesis, Moment::new(0, 0)).unwrap();
        engine.stake(&owner, UNITS_PER_TOKEN, 86_400, Moment::new(1, 3)).unwrap();

        save(&path, &engine).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded.status().unwrap(), engine.status().unwrap());
        assert_eq!(
            loaded.user_info(&owner, 0).unwrap(),
            engine.user_info(&owner, 0).unwrap()
        );
        fs::remove_dir_all(Path::new(&path).parent().unwrap()).unwrap();
    }

    #[test]
    fn test_load_missing_state_is_io_error() {
        assert!(matches!(load(&temp_state_path("missing")), Err(DripError::Io(_))));
    }
}
