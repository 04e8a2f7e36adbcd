//! Cash-secured put screener CLI
//!
//! Usage: csp_screen <snapshot.json> [preset] [csp|spreads] [config.json] [TICKERS]
//!
//! Arguments after the snapshot may come in any order:
//! - `preset` is one of default, ai, income, mak (default: default)
//! - `spreads` screens put credit spreads instead of single puts
//! - a `.json` path replaces the preset's thresholds but keeps its watchlist
//! - a comma-separated list such as `AAPL,MSFT` replaces the watchlist
//!
//! Set `RUST_LOG` for more detail.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use csp_screener::prelude::*;

const PROJECTION_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Puts,
    Spreads,
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    snapshot: String,
    preset: Preset,
    mode: Mode,
    config_path: Option<String>,
    tickers: Option<Vec<String>>,
}

impl Args {
    fn parse(args: &[String]) -> ScreenerResult<Self> {
        let (snapshot, rest) = args
            .split_first()
            .ok_or_else(|| ScreenerError::invalid_input("missing snapshot path"))?;

        let mut parsed = Args {
            snapshot: snapshot.clone(),
            ..Default::default()
        };

        for arg in rest {
            match arg.to_lowercase().as_str() {
                "csp" | "puts" => parsed.mode = Mode::Puts,
                "spreads" | "spread" => parsed.mode = Mode::Spreads,
                lower if lower.ends_with(".json") => parsed.config_path = Some(arg.clone()),
                _ => {
                    if let Some(preset) = Preset::from_name(arg) {
                        parsed.preset = preset;
                    } else {
                        parsed.tickers = Some(parse_tickers(arg)?);
                    }
                }
            }
        }

        Ok(parsed)
    }

    fn watchlist(&self) -> Watchlist {
        match &self.tickers {
            Some(tickers) => Watchlist::custom(tickers.iter().cloned()),
            None => self.preset.watchlist(),
        }
    }
}

fn parse_tickers(arg: &str) -> ScreenerResult<Vec<String>> {
    let tickers: Vec<String> = arg
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_uppercase)
        .collect();

    let valid = !tickers.is_empty()
        && tickers
            .iter()
            .all(|t| t.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-'));
    if !valid {
        return Err(ScreenerError::invalid_input(format!(
            "'{}' is not a preset, mode, config file or ticker list",
            arg
        )));
    }

    Ok(tickers)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().collect();
    if argv.len() < 2 {
        eprintln!(
            "Usage: {} <snapshot.json> [preset] [csp|spreads] [config.json] [TICKERS]",
            argv[0]
        );
        eprintln!("Presets: default, ai, income, mak");
        eprintln!("Tickers: comma-separated, e.g. AAPL,MSFT,KO");
        return ExitCode::FAILURE;
    }

    match Args::parse(&argv[1..]).and_then(|args| run(&args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> ScreenerResult<()> {
    let config = match &args.config_path {
        Some(path) => ScreeningConfig::from_json_file(path)?,
        None => args.preset.config(),
    };
    let watchlist = args.watchlist();
    let snapshot = MarketSnapshot::from_json_file(&args.snapshot)?;
    let screener = Screener::with_config(config)?;

    match args.mode {
        Mode::Puts => {
            println!("Cash-Secured Put Screener");
            println!("=========================\n");
            print_settings(screener.config(), &watchlist, &snapshot);

            let report = screener.screen_universe(&snapshot, &watchlist.symbols);
            print_candidates(&report);

            let projection = IncomeProjection::from_ranked(&report.candidates, PROJECTION_SIZE);
            print_projection(&projection);
        }
        Mode::Spreads => {
            println!("Put Credit Spread Screener");
            println!("==========================\n");
            print_settings(screener.config(), &watchlist, &snapshot);

            let report = screener.screen_spreads_universe(&snapshot, &watchlist.symbols);
            print_spreads(&report);

            let projection = IncomeProjection::from_ranked(&report.candidates, PROJECTION_SIZE);
            print_spread_projection(&projection);
        }
    }

    Ok(())
}

fn print_settings(config: &ScreeningConfig, watchlist: &Watchlist, snapshot: &MarketSnapshot) {
    println!("Watchlist: {} ({} symbols)", watchlist.name, watchlist.symbols.len());
    println!("As of: {}", snapshot.as_of);
    println!(
        "Delta: {:.2}-{:.2} | DTE: {}-{} | Min return: {:.2}%/mo | Top: {}",
        config.min_delta,
        config.max_delta,
        config.min_dte,
        config.max_dte,
        config.min_monthly_return,
        config.top_n
    );
    if let Some(ivr) = config.min_iv_rank {
        println!("Min IV rank: {:.0}", ivr);
    }
    if let Some(sector) = &config.sector {
        println!("Sector: {}", sector);
    }
    println!();
}

fn print_summary<T>(report: &ScreeningReport<T>) {
    println!(
        "Screened {} underlyings ({} skipped), {} candidates found",
        report.symbols_screened, report.symbols_skipped, report.total_found
    );
}

fn print_candidates(report: &ScreeningReport) {
    print_summary(report);

    if report.is_empty() {
        println!("\nNo opportunities matched the filters.");
        return;
    }

    println!(
        "\n{:<6} {:>8} {:>10} {:>4} {:>7} {:>7} {:>6} {:>6} {:>7} {:>7} {:>9} {:>4} {:>6} {:>7}",
        "Symbol", "Strike", "Expiry", "DTE", "Mid", "Delta", "IV%", "OTM%", "Ret/mo", "Θ $/day",
        "Capital", "Qual", "Score", "Rating"
    );
    println!("{}", "-".repeat(112));

    for c in &report.candidates {
        println!(
            "{:<6} {:>8.2} {:>10} {:>4} {:>7.2} {:>7.3} {:>6.1} {:>6.1} {:>7.2} {:>7.2} {:>9.0} {:>4} {:>6.2} {:<4}{}",
            c.symbol,
            c.strike,
            c.expiry.format("%Y-%m-%d"),
            c.dte,
            c.mid,
            c.greeks.delta,
            c.iv_pct,
            c.otm_pct,
            c.monthly_return,
            c.greeks.theta.abs(),
            c.capital_required,
            c.quality_score,
            c.score,
            c.rating.symbol(),
            if c.earnings_before_expiry { " E" } else { "" }
        );
    }
    println!("\nE = earnings before expiration");
}

fn print_spreads(report: &ScreeningReport<SpreadCandidate>) {
    print_summary(report);

    if report.is_empty() {
        println!("\nNo spreads matched the filters.");
        return;
    }

    println!(
        "\n{:<6} {:>13} {:>10} {:>4} {:>7} {:>8} {:>7} {:>8} {:>6} {:>6} {:>7} {:>4} {:>6}",
        "Symbol", "Strikes", "Expiry", "DTE", "Credit", "MaxLoss", "RoR%", "B/E", "POP%", "Delta",
        "Ret/mo", "Qual", "Score"
    );
    println!("{}", "-".repeat(106));

    for s in &report.candidates {
        println!(
            "{:<6} {:>13} {:>10} {:>4} {:>7.2} {:>8.0} {:>7.1} {:>8.2} {:>6.1} {:>6.3} {:>7.2} {:>4} {:>6.2}{}",
            s.symbol,
            format!("{:.1}/{:.1}", s.short_strike, s.long_strike),
            s.expiry.format("%Y-%m-%d"),
            s.dte,
            s.net_credit,
            s.capital_required,
            s.return_on_risk,
            s.breakeven,
            s.pop,
            s.delta,
            s.monthly_return,
            s.quality_score,
            s.score,
            if s.earnings_before_expiry { " E" } else { "" }
        );
    }
    println!("\nCredit and B/E per share; MaxLoss per contract. E = earnings before expiration");
}

fn print_projection(projection: &IncomeProjection) {
    if projection.is_empty() {
        return;
    }

    println!("\nIncome projection (top {})", projection.lines.len());
    println!("{}", "-".repeat(40));
    println!("  Weekly theta income:  ${:.0}", projection.weekly_total);
    println!("  Monthly theta income: ${:.0}", projection.monthly_total);
    println!("  Total capital needed: ${:.0}", projection.capital_total);
    if let Some(roi) = projection.monthly_roi() {
        println!("  Monthly ROI:          {:.2}%", roi);
    }
}

fn print_spread_projection(projection: &IncomeProjection) {
    if projection.is_empty() {
        return;
    }

    println!("\nSpread income projection (top {})", projection.lines.len());
    println!("{}", "-".repeat(40));
    for line in &projection.lines {
        println!(
            "  {:<6} {} ({:>3}d)  ${:>7.2}/day  ${:>8.0} at risk",
            line.symbol,
            line.expiry.format("%Y-%m-%d"),
            line.dte,
            line.daily,
            line.capital
        );
    }
    println!("  Weekly decay income:  ${:.0}", projection.weekly_total);
    println!("  Monthly decay income: ${:.0}", projection.monthly_total);
    println!("  Max profit if all expire OTM: ${:.0}", projection.max_profit_total);
    println!("  Total capital at risk: ${:.0}", projection.capital_total);
    if let Some(roi) = projection.max_roi() {
        println!("  Max ROI:              {:.2}%", roi);
    }
}
