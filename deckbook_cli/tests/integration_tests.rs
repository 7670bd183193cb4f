//! Integration tests for the deckbook binary.
//!
//! These tests verify end-to-end behavior including:
//! - Deck creation and listing
//! - Adding and removing cards under the copy limits
//! - Battle recording and statistics
//! - Data persistence between invocations

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const FIXTURE_CARDS: &str = r#"[
  {"name": "Pikachu", "set": "Base", "id": "1"},
  {"name": "Pikachu", "set": "Jungle", "id": "2"},
  {"name": "Snorlax", "set": "Jungle", "id": "3"},
  {"name": "Mewtwo ex", "set": "Genetic Apex (A1)", "id": "a1-129"}
]"#;

/// Helper to create a data directory with a cached card list
fn setup_test_dir() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("valid_cards.json"), FIXTURE_CARDS)
        .expect("Failed to write card fixture");
    temp_dir
}

/// Helper to get the CLI binary pointed at a data directory, offline
fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("deckbook"));
    cmd.arg("--data-dir").arg(data_dir).arg("--offline");
    cmd
}

/// Helper to create an empty saved deck
fn new_deck(data_dir: &Path, name: &str) {
    cli(data_dir).args(["new", name]).assert().success();
}

fn read_deck(data_dir: &Path, name: &str) -> serde_json::Value {
    let path = data_dir.join("decks").join(format!("{}.json", name));
    let contents = fs::read_to_string(path).expect("Failed to read deck file");
    serde_json::from_str(&contents).expect("Deck file is not JSON")
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("deckbook"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Card game deck builder and battle tracker",
        ));
}

#[test]
fn test_new_deck_and_list() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .arg("decks")
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved decks found"));

    cli(data_dir)
        .args(["new", "water"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New deck 'water' created"));
    cli(data_dir).args(["new", "electric"]).assert().success();

    cli(data_dir)
        .arg("decks")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. electric\n  2. water"));

    // Creating the same deck twice fails
    cli(data_dir).args(["new", "water"]).assert().failure();
}

#[test]
fn test_list_and_search_cards() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("cards")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            " - Mewtwo ex (Set: Genetic Apex (A1), ID: a1-129)",
        ));

    cli(temp_dir.path())
        .args(["cards", "--search", "JUNGLE"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Snorlax (Set: Jungle, ID: 3)"))
        .stdout(predicate::str::contains("Base").not());
}

#[test]
fn test_add_single_match_persists() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    new_deck(data_dir, "mine");

    cli(data_dir)
        .args(["add", "mine", "mewtwo"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Mewtwo ex from Genetic Apex (A1) added to your deck",
        ));

    let deck = read_deck(data_dir, "mine");
    assert_eq!(deck["cards"][0]["name"], "Mewtwo ex");
    assert_eq!(deck["cards"][0]["set"], "Genetic Apex (A1)");
    assert_eq!(deck["cards"][0]["count"], 1);
    assert_eq!(deck["battle_history"], serde_json::json!([]));
}

#[test]
fn test_ambiguous_add_with_pick_and_global_limit() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    new_deck(data_dir, "mine");

    cli(data_dir)
        .args(["add", "mine", "pikachu", "--pick", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Multiple matches found"))
        .stdout(predicate::str::contains("2. Pikachu (Set: Jungle, ID: 2)"))
        .stdout(predicate::str::contains("Pikachu from Base added"));

    cli(data_dir)
        .args(["add", "mine", "pikachu", "--pick", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("You now have 2 copies in this set"));

    cli(data_dir)
        .args(["add", "mine", "pikachu", "--pick", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Already have 2 copies of Pikachu (across all sets)",
        ));

    let deck = read_deck(data_dir, "mine");
    let cards = deck["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["count"], 2);
}

#[test]
fn test_ambiguous_add_reads_choice_from_stdin() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    new_deck(data_dir, "mine");

    cli(data_dir)
        .args(["add", "mine", "pikachu"])
        .write_stdin("2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pikachu from Jungle added"));

    cli(data_dir)
        .args(["add", "mine", "pikachu"])
        .write_stdin("three\n")
        .assert()
        .failure();

    cli(data_dir)
        .args(["add", "mine", "pikachu", "--pick", "5"])
        .assert()
        .failure();

    let deck = read_deck(data_dir, "mine");
    assert_eq!(deck["cards"].as_array().unwrap().len(), 1);
}

#[test]
fn test_add_by_id_and_not_found() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    new_deck(data_dir, "mine");

    cli(data_dir)
        .args(["add", "mine", "--id", "A1-129"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mewtwo ex from Genetic Apex (A1) added"));

    cli(data_dir)
        .args(["add", "mine", "charizard"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No valid card found matching 'charizard'",
        ));
}

#[test]
fn test_view_and_remove_by_position() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    new_deck(data_dir, "mine");

    cli(data_dir).args(["add", "mine", "--id", "1"]).assert().success();
    cli(data_dir).args(["add", "mine", "--id", "1"]).assert().success();
    cli(data_dir).args(["add", "mine", "snorlax"]).assert().success();

    cli(data_dir)
        .args(["view", "mine"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Pikachu x 2 from Base"))
        .stdout(predicate::str::contains("2. Snorlax x 1 from Jungle"));

    cli(data_dir)
        .args(["remove", "mine", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Now you have 1 copy(ies)"));

    cli(data_dir)
        .args(["remove", "mine", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pikachu from Base removed from your deck"));

    // Positions shift after a deletion
    cli(data_dir)
        .args(["remove", "mine", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing was removed"));

    cli(data_dir)
        .args(["view", "mine"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Snorlax x 1 from Jungle"));
}

#[test]
fn test_remove_from_empty_deck() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    new_deck(data_dir, "mine");
    cli(data_dir)
        .args(["remove", "mine", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cannot remove from an empty deck"));

    cli(data_dir)
        .args(["view", "mine"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Your deck is empty"));
}

#[test]
fn test_battles_and_statistics() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["stats", "mine"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deck 'mine' not found"))
        .stdout(predicate::str::contains("No battle records to show statistics"));
    new_deck(data_dir, "mine");

    let battles = [
        ("W", "C"),
        ("L", "A"),
        ("loss", "B"),
        ("win", "B"),
        ("l", "A"),
    ];
    for (result, opponent) in battles {
        cli(data_dir)
            .args(["battle", "mine", result, "--opponent", opponent])
            .assert()
            .success()
            .stdout(predicate::str::contains("Battle record added for deck 'mine'"));
    }

    cli(data_dir)
        .args(["stats", "mine"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Battles: 5"))
        .stdout(predicate::str::contains("Wins: 2"))
        .stdout(predicate::str::contains("Losses: 3"))
        .stdout(predicate::str::contains("Win Percentage: 40.00%"))
        .stdout(predicate::str::contains("Wins  : **\n"))
        .stdout(predicate::str::contains("Losses: ***\n"))
        .stdout(predicate::str::contains("A: 2 loss(es)\n  B: 1 loss(es)"));

    let deck = read_deck(data_dir, "mine");
    let history = deck["battle_history"].as_array().unwrap();
    assert_eq!(history.len(), 5);
    assert_eq!(history[2]["result"], "L");
    assert_eq!(history[3]["result"], "W");
}

#[test]
fn test_invalid_battle_result_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["battle", "mine", "draw"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid battle result"));

    assert!(!data_dir.join("decks/mine.json").exists());
}

#[test]
fn test_changing_an_unknown_deck_fails() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    new_deck(data_dir, "mine");

    let commands: [&[&str]; 4] = [
        &["add", "mnie", "snorlax"],
        &["add", "mnie", "--id", "3"],
        &["remove", "mnie", "1"],
        &["battle", "mnie", "W"],
    ];
    for args in commands {
        cli(data_dir)
            .args(args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("mnie"));
    }

    assert!(!data_dir.join("decks/mnie.json").exists());
    cli(data_dir)
        .arg("decks")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. mine"))
        .stdout(predicate::str::contains("mnie").not());

    // The existing deck is untouched
    let deck = read_deck(data_dir, "mine");
    assert_eq!(deck["cards"], serde_json::json!([]));
    assert_eq!(deck["battle_history"], serde_json::json!([]));
}
