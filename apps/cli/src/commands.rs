//! Command handlers.

use std::fs;
use std::io::Write;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, Utc};
use dars_core::algorithm::sm2::Sm2;
use dars_core::history::needs_practice;
use dars_core::types::{Grade, ItemId, ItemSeed, Quality, MAX_QUALITY};
use dars_core::{Clock, CoreError, ProgressEvent, Scheduler, StreakTracker};
use tracing::{info, warn};

use crate::cli::Command;
use crate::config::Config;
use crate::store::Store;

/// Execute one command against the store, writing results to `out`.
pub fn run<C, W>(
    command: Command,
    config: &Config,
    store: &Store,
    clock: C,
    out: &mut W,
) -> Result<()>
where
    C: Clock + Clone,
    W: Write,
{
    let sm2 = Sm2 {
        maximum_interval: config.max_interval_days,
        ..Sm2::default()
    };
    let mut scheduler = Scheduler::open(store, clock.clone())
        .context("failed to load cards")?
        .with_algorithm(Box::new(sm2));

    match command {
        Command::Seed { catalog } => {
            let contents = fs::read_to_string(&catalog)
                .with_context(|| format!("failed to read catalog {}", catalog.display()))?;
            let seeds: Vec<ItemSeed> = serde_json::from_str(&contents)
                .with_context(|| format!("invalid catalog {}", catalog.display()))?;
            let offered = seeds.len();

            match scheduler.seed(seeds) {
                Some(ProgressEvent::Seeded { added }) => {
                    scheduler.save().context("failed to save cards")?;
                    info!(added = added.len(), "seeded catalog");
                    writeln!(out, "Added {} of {} items.", added.len(), offered)?;
                }
                _ => writeln!(out, "All {offered} items are already known.")?,
            }
        }
        Command::Due { limit, json } => {
            let due = scheduler.get_due(limit.unwrap_or(config.due_limit));
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&due)?)?;
            } else if due.is_empty() {
                writeln!(out, "Nothing is due.")?;
            } else {
                for card in &due {
                    let star = if card.is_pinned { "*" } else { " " };
                    writeln!(
                        out,
                        "{star} {}  {} ({}) - {}",
                        card.item_id,
                        card.display.native,
                        card.display.transliteration,
                        card.display.translation
                    )?;
                }
            }
        }
        Command::Review { item, grade } => {
            let quality = parse_quality(&grade)?;
            let item_id = resolve_item(&scheduler, &item);

            match scheduler.review(&item_id, quality) {
                Some(ProgressEvent::Reviewed(record)) => {
                    store
                        .log_review(&record)
                        .context("failed to append review log")?;
                    scheduler.save().context("failed to save cards")?;
                    let verdict = if record.passed { "pass" } else { "lapse" };
                    writeln!(
                        out,
                        "{verdict}: next review in {} day(s), ease {:.2}",
                        record.interval_after, record.ease_after
                    )?;
                }
                _ => {
                    warn!(item = %item, "review for unknown item");
                    writeln!(out, "Unknown item: {item}")?;
                }
            }
        }
        Command::Pin { item } => set_pinned(&mut scheduler, &item, true, out)?,
        Command::Unpin { item } => set_pinned(&mut scheduler, &item, false, out)?,
        Command::Stats { json } => {
            let stats = scheduler.stats();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
            } else {
                writeln!(out, "Due: {} / Total: {}", stats.due_count, stats.total_count)?;
            }
        }
        Command::Next => match scheduler.next_upcoming_review_time() {
            Some(at) => writeln!(out, "Next review at {}", format_local(at))?,
            None if scheduler.stats().due_count > 0 => writeln!(out, "Cards are due now.")?,
            None => writeln!(out, "No cards scheduled.")?,
        },
        Command::Finish => {
            let mut streak = StreakTracker::open(store, clock, config.daily_reset_hour)
                .context("failed to load streak")?;
            match streak.record_session_completed() {
                Some(ProgressEvent::SessionCompleted { streak: days }) => {
                    streak.save().context("failed to save streak")?;
                    writeln!(out, "Session recorded. Streak: {days} day(s).")?;
                }
                _ => writeln!(
                    out,
                    "Already recorded today. Streak: {} day(s).",
                    streak.get_streak()
                )?,
            }
        }
        Command::Streak => {
            let streak = StreakTracker::open(store, clock, config.daily_reset_hour)
                .context("failed to load streak")?;
            writeln!(out, "Streak: {} day(s).", streak.get_streak())?;
        }
        Command::History { item } => {
            let item_id = resolve_item(&scheduler, &item);
            let Some(records) = store.reviews_for(&item_id)? else {
                bail!("this store does not keep review history");
            };
            for record in &records {
                writeln!(
                    out,
                    "{}  quality {}  interval {} -> {}",
                    format_local(record.reviewed_at),
                    record.quality,
                    record.interval_before,
                    record.interval_after
                )?;
            }
            let status = if needs_practice(&records) {
                "needs practice"
            } else {
                "learned"
            };
            writeln!(out, "{} review(s), {status}.", records.len())?;
        }
    }

    Ok(())
}

fn set_pinned<R, C, W>(
    scheduler: &mut Scheduler<R, C>,
    item: &str,
    pinned: bool,
    out: &mut W,
) -> Result<()>
where
    R: dars_core::CardRepository,
    C: Clock,
    W: Write,
{
    let item_id = resolve_item(scheduler, item);
    match scheduler.set_pinned(&item_id, pinned) {
        Some(_) => {
            scheduler.save().context("failed to save cards")?;
            let verb = if pinned { "Pinned" } else { "Unpinned" };
            writeln!(out, "{verb} {item_id}.")?;
        }
        None if scheduler.card(&item_id).is_some() => writeln!(out, "No change.")?,
        None => writeln!(out, "Unknown item: {item}")?,
    }
    Ok(())
}

/// Accept a grade name or a raw quality number from 0 to 5.
fn parse_quality(input: &str) -> Result<Quality> {
    if let Ok(quality) = input.trim().parse::<Quality>() {
        if quality > MAX_QUALITY {
            return Err(CoreError::InvalidGrade(input.to_string()).into());
        }
        return Ok(quality);
    }
    Ok(input.parse::<Grade>()?.quality())
}

/// Map user input to a card id: a known id, or the id derived from Persian text.
fn resolve_item<R, C>(scheduler: &Scheduler<R, C>, input: &str) -> String
where
    R: dars_core::CardRepository,
    C: Clock,
{
    let trimmed = input.trim();
    if scheduler.card(trimmed).is_some() {
        return trimmed.to_string();
    }
    ItemId::from_native_text(trimmed).as_str().to_string()
}

fn format_local(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use dars_core::ManualClock;
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};

    struct Fixture {
        _dir: tempfile::TempDir,
        config: Config,
        store: Store,
        clock: ManualClock,
        catalog: PathBuf,
    }

    fn fixture(db_name: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("lesson.json");
        fs::write(
            &catalog,
            r#"[
                {"item_id": "salam", "display": {"native": "سلام", "translation": "hello", "transliteration": "salām"}, "source_group_id": "greetings"},
                {"display": {"native": "خداحافظ", "translation": "goodbye", "transliteration": "khodāhāfez"}, "source_group_id": "greetings"}
            ]"#,
        )
        .unwrap();
        let config = Config {
            db_path: dir.path().join(db_name),
            daily_reset_hour: 0,
            due_limit: 20,
            max_interval_days: 30,
        };
        let store = Store::open(&config.db_path).unwrap();
        let start = DateTime::parse_from_rfc3339("2024-10-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Fixture {
            _dir: dir,
            config,
            store,
            clock: ManualClock::new(start),
            catalog,
        }
    }

    fn exec(fx: &Fixture, command: Command) -> String {
        let mut out = Vec::new();
        run(command, &fx.config, &fx.store, fx.clock.clone(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn seed(fx: &Fixture) -> String {
        exec(
            fx,
            Command::Seed {
                catalog: fx.catalog.clone(),
            },
        )
    }

    fn review(fx: &Fixture, item: &str, grade: &str) -> String {
        exec(
            fx,
            Command::Review {
                item: item.to_string(),
                grade: grade.to_string(),
            },
        )
    }

    #[test]
    fn seed_is_idempotent_across_runs() {
        let fx = fixture("dars.db");
        assert_eq!(seed(&fx), "Added 2 of 2 items.\n");
        assert_eq!(seed(&fx), "All 2 items are already known.\n");
        assert_eq!(
            exec(&fx, Command::Stats { json: false }),
            "Due: 2 / Total: 2\n"
        );
    }

    #[test]
    fn seed_rejects_blank_item_ids() {
        let fx = fixture("dars.db");
        fs::write(
            &fx.catalog,
            r#"[{"item_id": "  ", "display": {"native": "نان", "translation": "bread"}}]"#,
        )
        .unwrap();

        let mut out = Vec::new();
        let err = run(
            Command::Seed {
                catalog: fx.catalog.clone(),
            },
            &fx.config,
            &fx.store,
            fx.clock.clone(),
            &mut out,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("item id must not be empty"));
        assert_eq!(
            exec(&fx, Command::Stats { json: false }),
            "Due: 0 / Total: 0\n"
        );
    }

    #[test]
    fn padded_catalog_id_is_addressable_after_reload() {
        let fx = fixture("dars.db");
        fs::write(
            &fx.catalog,
            r#"[{"item_id": " salam ", "display": {"native": "سلام", "translation": "hello"}}]"#,
        )
        .unwrap();
        assert_eq!(seed(&fx), "Added 1 of 1 items.\n");
        assert_eq!(
            review(&fx, "salam", "good"),
            "pass: next review in 1 day(s), ease 2.50\n"
        );
    }

    #[test]
    fn review_interval_respects_configured_cap() {
        let fx = fixture("dars.db");
        seed(&fx);
        let mut last = String::new();
        for _ in 0..5 {
            last = review(&fx, "salam", "5");
        }
        assert!(last.starts_with("pass: next review in 30 day(s)"));
    }

    #[test]
    fn review_by_persian_text_and_history() {
        let fx = fixture("dars.db");
        seed(&fx);

        assert_eq!(
            review(&fx, "خداحافظ", "good"),
            "pass: next review in 1 day(s), ease 2.50\n"
        );
        assert_eq!(
            review(&fx, "salam", "again"),
            "lapse: next review in 1 day(s), ease 2.30\n"
        );
        assert_eq!(review(&fx, "missing", "easy"), "Unknown item: missing\n");

        let history = exec(
            &fx,
            Command::History {
                item: "salam".to_string(),
            },
        );
        assert!(history.ends_with("1 review(s), needs practice.\n"));
        assert_eq!(
            exec(&fx, Command::Stats { json: false }),
            "Due: 0 / Total: 2\n"
        );
    }

    #[test]
    fn due_lists_pinned_first() {
        let fx = fixture("dars.db");
        seed(&fx);
        let derived = ItemId::from_native_text("خداحافظ");

        assert_eq!(
            exec(
                &fx,
                Command::Pin {
                    item: "خداحافظ".to_string()
                }
            ),
            format!("Pinned {derived}.\n")
        );
        let listing = exec(
            &fx,
            Command::Due {
                limit: None,
                json: false,
            },
        );
        let first = listing.lines().next().unwrap();
        assert!(first.starts_with(&format!("* {derived}")));

        let limited = exec(
            &fx,
            Command::Due {
                limit: Some(1),
                json: false,
            },
        );
        assert_eq!(limited.lines().count(), 1);
    }

    #[test]
    fn finish_counts_each_day_once() {
        let fx = fixture("progress.json");
        assert_eq!(
            exec(&fx, Command::Finish),
            "Session recorded. Streak: 1 day(s).\n"
        );
        assert_eq!(
            exec(&fx, Command::Finish),
            "Already recorded today. Streak: 1 day(s).\n"
        );

        fx.clock.advance(Duration::days(1));
        assert_eq!(
            exec(&fx, Command::Finish),
            "Session recorded. Streak: 2 day(s).\n"
        );

        fx.clock.advance(Duration::days(2));
        assert_eq!(exec(&fx, Command::Streak), "Streak: 0 day(s).\n");
    }

    #[test]
    fn json_store_has_no_history() {
        let fx = fixture("progress.json");
        seed(&fx);
        review(&fx, "salam", "easy");

        let mut out = Vec::new();
        let result = run(
            Command::History {
                item: "salam".to_string(),
            },
            &fx.config,
            &fx.store,
            fx.clock.clone(),
            &mut out,
        );
        assert!(result.is_err());
        assert!(Path::new(&fx.config.db_path).exists());
    }

    #[test]
    fn next_reports_upcoming_review() {
        let fx = fixture("dars.db");
        assert_eq!(exec(&fx, Command::Next), "No cards scheduled.\n");
        seed(&fx);
        assert_eq!(exec(&fx, Command::Next), "Cards are due now.\n");
    }

    #[test]
    fn quality_parsing() {
        assert_eq!(parse_quality("4").unwrap(), 4);
        assert_eq!(parse_quality("hard").unwrap(), 3);
        assert_eq!(parse_quality("correct").unwrap(), 5);
        assert_eq!(parse_quality("0").unwrap(), 0);
        assert!(parse_quality("maybe").is_err());
        let err = parse_quality("9").unwrap_err();
        assert_eq!(err.to_string(), "invalid grade: 9");
    }
}
