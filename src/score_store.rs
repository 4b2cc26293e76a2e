use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredScoreEntry {
    name: String,
    matches: u64,
    #[serde(rename = "bestScore", alias = "best_score")]
    best_score: i32,
    #[serde(rename = "lastScore", alias = "last_score")]
    last_score: i32,
    #[serde(rename = "updatedAtMs", alias = "updated_at_ms")]
    updated_at_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ScoreStoreFile {
    version: u8,
    players: HashMap<String, StoredScoreEntry>,
}

#[derive(Clone, Debug, Deserialize)]
struct ScoreStoreFileRaw {
    version: u8,
    players: HashMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScoreBoardEntry {
    pub name: String,
    pub matches: u64,
    #[serde(rename = "bestScore")]
    pub best_score: i32,
    #[serde(rename = "lastScore")]
    pub last_score: i32,
    #[serde(rename = "updatedAtMs")]
    pub updated_at_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScoreBoardResponse {
    #[serde(rename = "generatedAt")]
    pub generated_at_iso: String,
    pub entries: Vec<ScoreBoardEntry>,
}

/// Historical score persistence. Every failure path logs and carries on: a
/// broken or missing store never affects a match outcome.
pub struct ScoreStore {
    file_path: PathBuf,
    players: HashMap<String, StoredScoreEntry>,
}

impl ScoreStore {
    pub fn new(file_path: PathBuf) -> Self {
        let players = load_players(&file_path);
        Self { file_path, players }
    }

    /// Records one finished match for one display name. Called exactly once
    /// per named player when a session turns terminal.
    pub fn record_score(&mut self, name: &str, score: i32) {
        let key = store_key(name);
        if key.is_empty() {
            return;
        }
        let now_ms = now_ms();
        let entry = self
            .players
            .entry(key)
            .or_insert_with(|| StoredScoreEntry {
                name: name.trim().to_string(),
                matches: 0,
                best_score: 0,
                last_score: 0,
                updated_at_ms: now_ms,
            });
        entry.name = name.trim().to_string();
        entry.matches += 1;
        entry.best_score = entry.best_score.max(score);
        entry.last_score = score;
        entry.updated_at_ms = now_ms;

        self.save();
    }

    pub fn build_response(&self, requested_limit: Option<usize>) -> ScoreBoardResponse {
        ScoreBoardResponse {
            generated_at_iso: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            entries: self.get_top(requested_limit),
        }
    }

    fn get_top(&self, requested_limit: Option<usize>) -> Vec<ScoreBoardEntry> {
        let normalized_limit = requested_limit.unwrap_or(10).clamp(1, 100);
        let mut entries: Vec<ScoreBoardEntry> = self
            .players
            .values()
            .map(|entry| ScoreBoardEntry {
                name: entry.name.clone(),
                matches: entry.matches,
                best_score: entry.best_score,
                last_score: entry.last_score,
                updated_at_ms: entry.updated_at_ms,
            })
            .collect();

        entries.sort_by(|a, b| {
            b.best_score
                .cmp(&a.best_score)
                .then_with(|| b.last_score.cmp(&a.last_score))
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        entries.truncate(normalized_limit);
        entries
    }

    fn save(&self) {
        if let Some(parent) = self.file_path.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                eprintln!(
                    "[score-store] failed to create parent dir {}: {error}",
                    parent.display()
                );
                return;
            }
        }

        let payload = ScoreStoreFile {
            version: 1,
            players: self.players.clone(),
        };
        match serde_json::to_string_pretty(&payload) {
            Ok(text) => {
                if let Err(error) = fs::write(&self.file_path, text) {
                    eprintln!(
                        "[score-store] failed to write {}: {error}",
                        self.file_path.display()
                    );
                }
            }
            Err(error) => {
                eprintln!(
                    "[score-store] failed to serialize payload for {}: {error}",
                    self.file_path.display()
                );
            }
        }
    }
}

fn load_players(path: &Path) -> HashMap<String, StoredScoreEntry> {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                eprintln!("[score-store] failed to read {}: {error}", path.display());
            }
            return HashMap::new();
        }
    };
    let parsed: ScoreStoreFileRaw = match serde_json::from_str::<ScoreStoreFileRaw>(&text) {
        Ok(value) if value.version == 1 => value,
        Ok(value) => {
            eprintln!(
                "[score-store] unsupported version {} at {}",
                value.version,
                path.display()
            );
            return HashMap::new();
        }
        Err(error) => {
            eprintln!("[score-store] failed to parse {}: {error}", path.display());
            return HashMap::new();
        }
    };

    let mut sanitized = HashMap::<String, StoredScoreEntry>::new();
    for (player_key, raw_value) in parsed.players {
        let value: StoredScoreEntry = match serde_json::from_value(raw_value) {
            Ok(entry) => entry,
            Err(error) => {
                eprintln!(
                    "[score-store] failed to parse entry '{}' in {}: {error}",
                    player_key,
                    path.display()
                );
                continue;
            }
        };
        let Some(normalized) = sanitize_stored_entry(value) else {
            continue;
        };
        let key = store_key(&normalized.name);
        if key.is_empty() {
            continue;
        }

        match sanitized.get_mut(&key) {
            Some(current) => {
                current.name = normalized.name;
                current.matches += normalized.matches;
                current.best_score = current.best_score.max(normalized.best_score);
                if normalized.updated_at_ms >= current.updated_at_ms {
                    current.last_score = normalized.last_score;
                    current.updated_at_ms = normalized.updated_at_ms;
                }
            }
            None => {
                sanitized.insert(key, normalized);
            }
        }
    }

    sanitized
}

fn sanitize_stored_entry(value: StoredScoreEntry) -> Option<StoredScoreEntry> {
    let normalized_name = value.name.trim().to_string();
    if normalized_name.is_empty() {
        return None;
    }
    if value.best_score < 0 || value.last_score < 0 {
        return None;
    }
    Some(StoredScoreEntry {
        name: normalized_name,
        matches: value.matches,
        best_score: value.best_score,
        last_score: value.last_score,
        updated_at_ms: value.updated_at_ms,
    })
}

fn store_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
