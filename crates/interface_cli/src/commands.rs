//! Line-oriented command parser

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use domain_claims::{DocumentType, WeatherQuery};

/// Claim form field addressed by `set`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    LossType,
    SurveyNumber,
    Area,
    Description,
}

impl FromStr for FormField {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loss_type" | "loss" => Ok(FormField::LossType),
            "survey_number" | "survey" => Ok(FormField::SurveyNumber),
            "area" | "area_affected" => Ok(FormField::Area),
            "description" | "desc" => Ok(FormField::Description),
            other => Err(CommandError::InvalidArgument {
                command: "set",
                reason: format!("unknown form field '{}'", other),
            }),
        }
    }
}

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { phone: String },
    Verify { phone: String, otp: String },
    Logout,
    Weather(WeatherQuery),
    Acknowledge { has_damage: bool },
    OpenForm,
    Set { field: FormField, value: String },
    Create,
    Photo(PathBuf),
    Documents,
    Rescan,
    Upload { document_type: DocumentType, path: PathBuf },
    Review,
    Back,
    Submit { confirmed: bool },
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("'{command}': {reason}")]
    InvalidArgument {
        command: &'static str,
        reason: String,
    },
}

pub const HELP: &str = "\
login <phone>                 request an OTP
verify <phone> <otp>          sign in with the OTP
logout                        forget stored credentials
weather [lat lon]             check weather for the farm
ack yes|no                    answer the weather alert
form                          open the claim form (files manually past an alert)
set <field> <value>           loss_type, survey, area, description
create                        create the claim
photo <path>                  upload a photo of the damage
documents                     continue to documents
rescan                        re-check the document vault
upload <type> <path>          upload a missing document
review | back                 move between documents and review
submit [yes]                  submit; 'yes' confirms
status                        show the session
quit                          abandon and exit";

fn required<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    words
        .next()
        .ok_or(CommandError::MissingArgument { command, argument })
}

fn parse_bool(command: &'static str, word: &str) -> Result<bool, CommandError> {
    match word.to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" => Ok(true),
        "no" | "n" | "false" => Ok(false),
        other => Err(CommandError::InvalidArgument {
            command,
            reason: format!("expected yes or no, got '{}'", other),
        }),
    }
}

fn parse_coordinate(word: &str) -> Result<f64, CommandError> {
    word.parse().map_err(|_| CommandError::InvalidArgument {
        command: "weather",
        reason: format!("'{}' is not a coordinate", word),
    })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(Command::Status);
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "login" => Command::Login {
                phone: required(&mut words, "login", "a phone number")?.to_string(),
            },
            "verify" => Command::Verify {
                phone: required(&mut words, "verify", "a phone number")?.to_string(),
                otp: required(&mut words, "verify", "the OTP")?.to_string(),
            },
            "logout" => Command::Logout,
            "weather" => match (words.next(), words.next()) {
                (None, _) => Command::Weather(WeatherQuery::default()),
                (Some(lat), Some(lon)) => Command::Weather(WeatherQuery::at(
                    parse_coordinate(lat)?,
                    parse_coordinate(lon)?,
                )),
                (Some(_), None) => {
                    return Err(CommandError::MissingArgument {
                        command: "weather",
                        argument: "both latitude and longitude",
                    })
                }
            },
            "ack" => Command::Acknowledge {
                has_damage: parse_bool("ack", required(&mut words, "ack", "yes or no")?)?,
            },
            "form" => Command::OpenForm,
            "set" => {
                let field = required(&mut words, "set", "a field name")?.parse()?;
                let value = words.collect::<Vec<_>>().join(" ");
                Command::Set { field, value }
            }
            "create" => Command::Create,
            "photo" => Command::Photo(PathBuf::from(required(&mut words, "photo", "a file path")?)),
            "documents" | "docs" => Command::Documents,
            "rescan" => Command::Rescan,
            "upload" => Command::Upload {
                document_type: DocumentType::new(required(&mut words, "upload", "a document type")?),
                path: PathBuf::from(required(&mut words, "upload", "a file path")?),
            },
            "review" => Command::Review,
            "back" => Command::Back,
            "submit" => Command::Submit {
                confirmed: match words.next() {
                    Some(word) => parse_bool("submit", word)?,
                    None => false,
                },
            },
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weather_with_and_without_coordinates() {
        assert_eq!(
            "weather".parse::<Command>().unwrap(),
            Command::Weather(WeatherQuery::default())
        );
        assert_eq!(
            "weather 20.1 74.1".parse::<Command>().unwrap(),
            Command::Weather(WeatherQuery::at(20.1, 74.1))
        );
        assert!(matches!(
            "weather 20.1".parse::<Command>(),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_set_keeps_spaces_in_value() {
        let command: Command = "set description hail flattened the crop".parse().unwrap();
        assert_eq!(
            command,
            Command::Set {
                field: FormField::Description,
                value: "hail flattened the crop".to_string(),
            }
        );
    }

    #[test]
    fn test_submit_requires_explicit_yes() {
        assert_eq!(
            "submit".parse::<Command>().unwrap(),
            Command::Submit { confirmed: false }
        );
        assert_eq!(
            "submit yes".parse::<Command>().unwrap(),
            Command::Submit { confirmed: true }
        );
    }

    #[test]
    fn test_upload_normalises_document_type() {
        let command: Command = "upload Land-Record /tmp/7-12.pdf".parse().unwrap();
        assert_eq!(
            command,
            Command::Upload {
                document_type: DocumentType::new("land_record"),
                path: PathBuf::from("/tmp/7-12.pdf"),
            }
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            "harvest".parse::<Command>(),
            Err(CommandError::Unknown("harvest".to_string()))
        );
        assert!(matches!(
            "ack maybe".parse::<Command>(),
            Err(CommandError::InvalidArgument { command: "ack", .. })
        ));
        assert!(matches!(
            "set colour red".parse::<Command>(),
            Err(CommandError::InvalidArgument { command: "set", .. })
        ));
    }

    #[test]
    fn test_blank_line_shows_status() {
        assert_eq!("   ".parse::<Command>().unwrap(), Command::Status);
    }
}
