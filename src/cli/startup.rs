//! Interactive input for the fetch command
//!
//! Missing dataset or year values are prompted for when stdin is a terminal.
//! Invalid answers are re-prompted; end of input aborts.

use std::io::{self, BufRead, Write};

use chrono::{Datelike, Local};
use tracing::debug;

use crate::app::DatasetCatalog;
use crate::cli::args::FetchArgs;
use crate::constants::tse;
use crate::errors::{AppError, Result};

/// Most recent election year accepted (the current year)
pub fn latest_year() -> u16 {
    u16::try_from(Local::now().year()).unwrap_or(u16::MAX)
}

/// Check a year against the range the archive covers
pub fn validate_year(year: u16, latest: u16) -> Result<u16> {
    if (tse::FIRST_YEAR..=latest).contains(&year) {
        Ok(year)
    } else {
        Err(AppError::invalid_input(format!(
            "Year must be between {} and {}, got {}",
            tse::FIRST_YEAR,
            latest,
            year
        )))
    }
}

/// Line-oriented prompter over any reader/writer pair
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask for a dataset by list number or identifier
    pub fn select_dataset(&mut self, catalog: &DatasetCatalog) -> Result<String> {
        let datasets: Vec<_> = catalog.iter().collect();
        if datasets.is_empty() {
            return Err(AppError::invalid_input("No datasets available"));
        }

        writeln!(self.output)?;
        writeln!(self.output, "Available datasets:")?;
        for (i, dataset) in datasets.iter().enumerate() {
            writeln!(
                self.output,
                "  {}. {:<16} {}",
                i + 1,
                dataset.id,
                dataset.description
            )?;
        }
        writeln!(self.output)?;

        loop {
            let answer = self
                .ask(&format!("Select dataset (1-{}): ", datasets.len()))?
                .to_lowercase();

            let by_number = answer
                .parse::<usize>()
                .ok()
                .filter(|choice| (1..=datasets.len()).contains(choice))
                .map(|choice| datasets[choice - 1].id);
            let by_id = datasets.iter().find(|d| d.id == answer).map(|d| d.id);

            if let Some(id) = by_number.or(by_id) {
                debug!("Selected dataset: {}", id);
                return Ok(id.to_string());
            }

            writeln!(
                self.output,
                "Invalid choice. Enter a number between 1 and {} or a dataset name",
                datasets.len()
            )?;
        }
    }

    /// Ask for an election year
    pub fn select_year(&mut self, latest: u16) -> Result<u16> {
        loop {
            let answer = self.ask(&format!(
                "Election year ({}-{}): ",
                tse::FIRST_YEAR,
                latest
            ))?;

            match answer.parse::<u16>() {
                Ok(year) if validate_year(year, latest).is_ok() => return Ok(year),
                _ => writeln!(
                    self.output,
                    "Invalid year. Enter a year between {} and {}",
                    tse::FIRST_YEAR,
                    latest
                )?,
            }
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(AppError::invalid_input("Input closed before a value was given"));
        }
        Ok(line.trim().to_string())
    }
}

/// Resolve the dataset and year for a fetch, prompting when allowed
pub fn resolve_fetch_inputs(args: &FetchArgs, catalog: &DatasetCatalog) -> Result<(String, u16)> {
    let latest = latest_year();
    let interactive = atty::is(atty::Stream::Stdin);
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    let dataset = match &args.dataset {
        Some(dataset) => dataset.clone(),
        None if interactive => prompter.select_dataset(catalog)?,
        None => {
            return Err(AppError::invalid_input(format!(
                "A dataset is required. Available: {}",
                catalog.ids().join(", ")
            )))
        }
    };

    let year = match args.year {
        Some(year) => validate_year(year, latest)?,
        None if interactive => prompter.select_year(latest)?,
        None => return Err(AppError::invalid_input("An election year is required")),
    };

    Ok((dataset, year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_validate_year() {
        assert_eq!(validate_year(2022, 2024).unwrap(), 2022);
        assert_eq!(validate_year(1994, 2024).unwrap(), 1994);
        assert!(validate_year(1993, 2024).is_err());
        assert!(validate_year(2026, 2024).is_err());
        assert_eq!(validate_year(1990, 2024).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn test_select_dataset_by_number_and_name() {
        let catalog = DatasetCatalog::builtin();

        let mut by_number = prompter("1\n");
        assert_eq!(by_number.select_dataset(&catalog).unwrap(), "cand");

        let mut by_name = prompter("bens\n");
        assert_eq!(by_name.select_dataset(&catalog).unwrap(), "bens");
    }

    #[test]
    fn test_select_dataset_ignores_case() {
        let catalog = DatasetCatalog::builtin();
        let mut prompter = prompter("CAND\n");

        assert_eq!(prompter.select_dataset(&catalog).unwrap(), "cand");
        let output = String::from_utf8(prompter.output).unwrap();
        assert!(!output.contains("Invalid choice"));
    }

    #[test]
    fn test_select_dataset_reprompts() {
        let catalog = DatasetCatalog::builtin();
        let mut prompter = prompter("0\nsenado\n2\n");

        assert_eq!(prompter.select_dataset(&catalog).unwrap(), "cassacao");
        let output = String::from_utf8(prompter.output).unwrap();
        assert_eq!(output.matches("Invalid choice").count(), 2);
        assert!(output.contains("Candidate data"));
    }

    #[test]
    fn test_select_year_reprompts() {
        let mut prompter = prompter("abc\n1980\n2022\n");
        assert_eq!(prompter.select_year(2024).unwrap(), 2022);

        let output = String::from_utf8(prompter.output).unwrap();
        assert_eq!(output.matches("Invalid year").count(), 2);
    }

    #[test]
    fn test_closed_input_aborts() {
        let mut prompter = prompter("");
        let err = prompter.select_year(2024).unwrap_err();
        assert_eq!(err.category(), "invalid_input");
    }
}
