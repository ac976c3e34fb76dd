use dvbsi::classify::StandardLookup;
use dvbsi::epg::{Assembler, DecodeError, EpgEvent, Options};
use dvbsi::psi::SectionIter;

#[derive(Default)]
struct Stats {
    accepted: u64,
    rejected: u64,
    duplicated: u64,
    unknown: u64,
    broken: u64,
}

const HELP: &str = "\
番組表を表示するコマンド

USAGE:
  epg [OPTIONS] [PATH]

FLAGS:
  -h, --help           このヘルプを表示する

OPTIONS:
  --max-description N  拡張記述の最大バイト数
  --max-items N        拡張形式イベントの項目の最大数

ARGS:
  <PATH>               EITのセクションを連結したファイルのパス
";

fn print_event(event: &EpgEvent) {
    let start = event.start().and_then(|dt| {
        let date = chrono::NaiveDate::from_ymd_opt(
            dt.date.year as i32,
            dt.date.month as u32,
            dt.date.day as u32,
        )?;
        date.and_hms_opt(dt.hour as u32, dt.minute as u32, dt.second as u32)
    });
    let duration = chrono::Duration::seconds(event.duration_secs() as i64);

    match start {
        Some(start) => println!(
            "\t{} - {} {}",
            start,
            start + duration,
            event.event_name.escape_ascii()
        ),
        None => println!("\t(未定) {}", event.event_name.escape_ascii()),
    }
    println!("\t[{}]", event.running_status);

    if !event.short_description.is_empty() {
        println!("\t{}", event.short_description.escape_ascii());
    }
    if let Some(text) = event.content_text(&StandardLookup) {
        println!("\tジャンル: {}", text);
    }
    if let Some(text) = event.component_text(&StandardLookup) {
        println!("\t映像: {}", text);
    }
    if let Some(age) = event.parental_rating.and_then(|r| r.minimum_age()) {
        println!("\t{}歳以上", age);
    }
    for item in &event.items {
        println!(
            "\t{}: {}",
            item.description.escape_ascii(),
            item.item.escape_ascii()
        );
    }
    if !event.long_description.is_empty() {
        println!("\t{}", event.long_description.escape_ascii());
    }
    println!("\t{}", "-".repeat(100));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{}", HELP);
        std::process::exit(0);
    }

    let options = Options {
        max_long_description: args.opt_value_from_str("--max-description")?,
        max_items: args.opt_value_from_str("--max-items")?,
    };
    let path: std::path::PathBuf = args.free_from_str()?;

    env_logger::init();

    let buf = std::fs::read(path)?;

    let mut assembler = Assembler::with_options(options);
    let mut stats = Stats::default();
    for section in SectionIter::new(&buf) {
        match assembler.decode_section(section) {
            Ok(()) => stats.accepted += 1,
            Err(DecodeError::ContinuityRejected) => stats.rejected += 1,
            Err(DecodeError::DuplicateVersion) => stats.duplicated += 1,
            Err(DecodeError::UnknownTable(_)) => stats.unknown += 1,
            Err(e) => {
                log::warn!("broken section: {}", e);
                stats.broken += 1;
            }
        }
    }
    log::info!(
        "accepted: {}, rejected: {}, duplicated: {}, unknown: {}, broken: {}",
        stats.accepted,
        stats.rejected,
        stats.duplicated,
        stats.unknown,
        stats.broken,
    );

    let mut service_ids: Vec<u16> = assembler.iter_events().map(|e| e.service_id).collect();
    service_ids.sort_unstable();
    service_ids.dedup();

    for service_id in service_ids {
        let mut events: Vec<&EpgEvent> = assembler
            .iter_events()
            .filter(|e| e.service_id == service_id)
            .collect();
        events.sort_by_key(|e| e.start_time);

        println!("service {:#06X}", service_id);
        for event in events {
            print_event(event);
        }
    }

    Ok(())
}
