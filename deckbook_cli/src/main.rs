use clap::{Parser, Subcommand};
use deckbook_core::*;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deckbook")]
#[command(about = "Card game deck builder and battle tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use the cached card list only, never the online database
    #[arg(long, global = true)]
    offline: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved decks
    Decks,

    /// Create a new, empty deck
    New {
        /// Deck name
        deck: String,
    },

    /// List cards in the catalog
    Cards {
        /// Only show cards whose name or set contains this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Add a card to a deck (search by name or set)
    Add {
        /// Deck name
        deck: String,

        /// Search term
        #[arg(required_unless_present = "id")]
        term: Option<String>,

        /// Add the card with this catalog ID instead of searching
        #[arg(long, conflicts_with = "term")]
        id: Option<String>,

        /// Candidate number to use when the search matches several cards
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Show the cards in a deck
    View {
        /// Deck name
        deck: String,
    },

    /// Remove one copy of a card by its position in `view`
    Remove {
        /// Deck name
        deck: String,

        /// Position (number) shown by `view`
        position: usize,
    },

    /// Record a battle outcome
    Battle {
        /// Deck name
        deck: String,

        /// W for win, L for loss
        #[arg(value_parser = parse_battle_result)]
        result: BattleResult,

        /// Opponent deck details (or other metadata)
        #[arg(long, default_value = "")]
        opponent: String,
    },

    /// Show battle statistics for a deck
    Stats {
        /// Deck name
        deck: String,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    deckbook_core::logging::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    if cli.offline {
        config.catalog.offline = true;
    }

    let store = JsonDeckStore::new(config.decks_dir());

    match cli.command {
        Commands::Decks => cmd_decks(&store),
        Commands::New { deck } => cmd_new(&store, &deck),
        Commands::Cards { search } => cmd_cards(&config, search.as_deref()),
        Commands::Add {
            deck,
            term,
            id,
            pick,
        } => cmd_add(&store, &config, &deck, term.as_deref(), id.as_deref(), pick),
        Commands::View { deck } => cmd_view(&store, &deck),
        Commands::Remove { deck, position } => cmd_remove(&store, &deck, position),
        Commands::Battle {
            deck,
            result,
            opponent,
        } => cmd_battle(&store, &deck, result, &opponent),
        Commands::Stats { deck } => cmd_stats(&store, &deck),
    }
}

fn cmd_decks(store: &JsonDeckStore) -> Result<()> {
    let decks = store.list_decks()?;
    if decks.is_empty() {
        println!("No saved decks found.");
        return Ok(());
    }

    println!("Existing decks:");
    for (idx, name) in decks.iter().enumerate() {
        println!("  {}. {}", idx + 1, name);
    }
    Ok(())
}

fn cmd_new(store: &JsonDeckStore, name: &str) -> Result<()> {
    let deck = store.create_deck(name)?;
    println!("New deck '{}' created.", deck.name);
    Ok(())
}

fn cmd_cards(config: &Config, search: Option<&str>) -> Result<()> {
    let catalog = load_catalog(config);
    if catalog.is_empty() {
        println!("No valid cards available.");
        return Ok(());
    }

    let cards: Vec<&CatalogCard> = match search {
        Some(term) => catalog.search(term).collect(),
        None => catalog.cards().iter().collect(),
    };
    if cards.is_empty() {
        println!("No valid card found matching '{}'.", search.unwrap_or_default());
        return Ok(());
    }

    println!("Available Cards:");
    for card in cards {
        println!(" - {}", card);
    }
    Ok(())
}

fn cmd_add(
    store: &JsonDeckStore,
    config: &Config,
    deck_name: &str,
    term: Option<&str>,
    id: Option<&str>,
    pick: Option<usize>,
) -> Result<()> {
    let mut deck = open_existing_deck(store, deck_name)?;
    let catalog = load_catalog(config);
    let engine = CompositionEngine::new(&catalog);

    let outcome = match (id, term) {
        (Some(id), _) => engine.add_card_by_id(&mut deck, id),
        (None, Some(term)) => match engine.add_card(&mut deck, term) {
            AddOutcome::AmbiguousNeedsChoice(candidates) => {
                println!("Multiple matches found:");
                for (idx, card) in candidates.iter().enumerate() {
                    println!("  {}. {}", idx + 1, card);
                }
                let selection = match pick {
                    Some(selection) => selection,
                    None => prompt_selection()?,
                };
                engine.resolve(&mut deck, &candidates, selection)?
            }
            outcome => outcome,
        },
        (None, None) => return Err(Error::Other("Provide a search term or --id".into())),
    };

    match outcome {
        AddOutcome::Added { entry, .. } => {
            if entry.count == SET_COPY_LIMIT {
                println!(
                    "{} from {} added. You now have {} copies in this set.",
                    entry.name, entry.set, entry.count
                );
            } else {
                println!("{} from {} added to your deck.", entry.name, entry.set);
            }
            store.save(&deck)?;
            println!("Deck '{}' saved.", deck.name);
        }
        AddOutcome::AtGlobalLimit { name, total_copies } => {
            println!(
                "Already have {} copies of {} (across all sets). Cannot add more.",
                total_copies, name
            );
        }
        AddOutcome::AtSetLimit { name, set } => {
            println!("Already have {} copies of {} from {}.", SET_COPY_LIMIT, name, set);
        }
        AddOutcome::NotFound => {
            println!(
                "No valid card found matching '{}'.",
                id.or(term).unwrap_or_default()
            );
        }
        AddOutcome::AmbiguousNeedsChoice(_) => {
            // add_card_by_id and resolve always settle on one card
            return Err(Error::Other("Card selection was not resolved".into()));
        }
    }
    Ok(())
}

fn cmd_view(store: &JsonDeckStore, deck_name: &str) -> Result<()> {
    let deck = open_deck(store, deck_name)?;
    display_deck(&deck);
    Ok(())
}

fn cmd_remove(store: &JsonDeckStore, deck_name: &str, position: usize) -> Result<()> {
    let mut deck = open_existing_deck(store, deck_name)?;
    if deck.is_empty() {
        println!("Cannot remove from an empty deck.");
        return Ok(());
    }

    let outcome = match position.checked_sub(1) {
        Some(index) => deck.remove_card(index),
        None => RemoveOutcome::InvalidIndex,
    };

    match outcome {
        RemoveOutcome::Removed { entry, remaining } => {
            if remaining > 0 {
                println!(
                    "One copy of {} from {} removed. Now you have {} copy(ies).",
                    entry.name, entry.set, remaining
                );
            } else {
                println!("{} from {} removed from your deck.", entry.name, entry.set);
            }
            store.save(&deck)?;
            println!("Deck '{}' saved.", deck.name);
        }
        RemoveOutcome::InvalidIndex => {
            println!("Invalid position {}. Nothing was removed.", position);
        }
    }
    Ok(())
}

fn cmd_battle(
    store: &JsonDeckStore,
    deck_name: &str,
    result: BattleResult,
    opponent: &str,
) -> Result<()> {
    let mut deck = open_existing_deck(store, deck_name)?;
    deck.record_battle(result, opponent);
    store.save(&deck)?;
    println!("Battle record added for deck '{}'.", deck.name);
    Ok(())
}

fn cmd_stats(store: &JsonDeckStore, deck_name: &str) -> Result<()> {
    let deck = open_deck(store, deck_name)?;
    let Some(stats) = deck.statistics() else {
        println!("No battle records to show statistics.");
        return Ok(());
    };

    println!("Battle Statistics for '{}':", deck.name);
    println!("  Total Battles: {}", stats.total);
    println!("  Wins: {}", stats.wins);
    println!("  Losses: {}", stats.losses);
    println!("  Win Percentage: {:.2}%", stats.win_pct);
    println!();
    println!("Win/Loss Graph:");
    println!("Wins  : {}", stats.win_bar());
    println!("Losses: {}", stats.loss_bar());

    if !stats.losses_by_opponent.is_empty() {
        println!();
        println!("Loss Frequency by Opponent Deck:");
        for (opponent, count) in &stats.losses_by_opponent {
            println!("  {}: {} loss(es)", opponent, count);
        }
    }
    Ok(())
}

/// Load the catalog, reporting any fallback on stderr
fn load_catalog(config: &Config) -> CardCatalog {
    let loaded = CatalogLoader::new(config).load();
    if let Some(warning) = &loaded.warning {
        eprintln!("Warning: {}", warning);
    }
    for error in loaded.catalog.validate() {
        tracing::warn!("Catalog: {}", error);
    }
    tracing::debug!(
        "Catalog ready: {} cards ({:?})",
        loaded.catalog.len(),
        loaded.source
    );
    loaded.catalog
}

/// Load a deck for reading; a deck that was never saved reads as empty
fn open_deck(store: &JsonDeckStore, name: &str) -> Result<Deck> {
    let loaded = store.load(name)?;
    match &loaded.status {
        LoadStatus::New => println!("Deck '{}' not found.", loaded.deck.name),
        LoadStatus::Reset(reason) => warn_reset(reason),
        LoadStatus::Loaded => {}
    }
    Ok(loaded.deck)
}

/// Load a deck that is about to change; it must have been created with `new`
///
/// A corrupt deck file still counts as existing and is replaced on save.
fn open_existing_deck(store: &JsonDeckStore, name: &str) -> Result<Deck> {
    let loaded = store.load(name)?;
    match &loaded.status {
        LoadStatus::New => return Err(Error::DeckNotFound(loaded.deck.name)),
        LoadStatus::Reset(reason) => warn_reset(reason),
        LoadStatus::Loaded => {}
    }
    Ok(loaded.deck)
}

fn warn_reset(reason: &str) {
    eprintln!("Warning: {}. Starting with an empty deck.", reason);
}

fn display_deck(deck: &Deck) {
    if deck.is_empty() {
        println!("Your deck is empty.");
        return;
    }

    println!("Deck: {} ({} cards)", deck.name, deck.card_count());
    for (idx, entry) in deck.entries().iter().enumerate() {
        println!("  {}. {}", idx + 1, entry);
    }
}

fn prompt_selection() -> Result<usize> {
    print!("Enter the number of the card you want to add: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    input
        .trim()
        .parse()
        .map_err(|_| Error::Other(format!("Please enter a valid number, got '{}'", input.trim())))
}

fn parse_battle_result(s: &str) -> std::result::Result<BattleResult, String> {
    s.parse().map_err(|e: Error| e.to_string())
}
