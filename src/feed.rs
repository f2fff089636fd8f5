use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{Result, ScrapeError};

const SEASON_PATH: [&str; 3] = ["Show", "Episodelist", "Season"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedDocument {
    seasons: Vec<FeedSeason>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSeason {
    /// The `no` attribute, when present.
    pub no: Option<String>,
    pub episodes: Vec<FeedEpisode>,
}

/// Raw text of an `<episode>` element's children. `None` means the child
/// element is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEpisode {
    pub seasonnum: Option<String>,
    pub airdate: Option<String>,
}

impl FeedDocument {
    pub fn seasons(&self) -> &[FeedSeason] {
        &self.seasons
    }

    /// Episodes of every season whose `no` attribute equals `no`, in
    /// document order.
    pub fn episodes_of<'a>(&'a self, no: &'a str) -> impl Iterator<Item = &'a FeedEpisode> + 'a {
        self.seasons
            .iter()
            .filter(move |season| season.no.as_deref() == Some(no))
            .flat_map(|season| season.episodes.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EpisodeField {
    SeasonNum,
    AirDate,
}

struct Capture {
    field: EpisodeField,
    depth: usize,
    text: String,
}

pub fn parse_feed(xml: &str) -> Result<FeedDocument> {
    if xml.trim().is_empty() {
        return Err(ScrapeError::xml("feed is empty"));
    }

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut document = FeedDocument::default();
    let mut path: Vec<String> = Vec::new();
    let mut capture: Option<Capture> = None;
    let mut root_closed = false;
    let mut saw_root = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|err| ScrapeError::xml(format!("XML parse error: {err}")))?;
        match event {
            Event::Start(e) => {
                open_element(&e, &mut path, &mut root_closed, &mut saw_root)?;
                enter(&e, &path, &mut document, &mut capture)?;
            }
            Event::Empty(e) => {
                open_element(&e, &mut path, &mut root_closed, &mut saw_root)?;
                enter(&e, &path, &mut document, &mut capture)?;
                leave(&mut path, &mut document, &mut capture, &mut root_closed);
            }
            Event::End(_) => {
                leave(&mut path, &mut document, &mut capture, &mut root_closed);
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|err| ScrapeError::xml(format!("XML text error: {err}")))?;
                if path.is_empty() && !text.trim().is_empty() {
                    return Err(ScrapeError::xml("text outside of the root element"));
                }
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !path.is_empty() {
        return Err(ScrapeError::xml(format!(
            "unclosed element <{}>",
            path.join("/")
        )));
    }
    if !saw_root {
        return Err(ScrapeError::xml("feed has no root element"));
    }

    Ok(document)
}

fn open_element(
    e: &BytesStart<'_>,
    path: &mut Vec<String>,
    root_closed: &mut bool,
    saw_root: &mut bool,
) -> Result<()> {
    if path.is_empty() {
        if *root_closed {
            return Err(ScrapeError::xml("multiple root elements"));
        }
        *saw_root = true;
    }
    path.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    Ok(())
}

fn enter(
    e: &BytesStart<'_>,
    path: &[String],
    document: &mut FeedDocument,
    capture: &mut Option<Capture>,
) -> Result<()> {
    if is_path(path, &SEASON_PATH) {
        let no = e
            .try_get_attribute("no")
            .map_err(|err| ScrapeError::xml(format!("bad Season attribute: {err}")))?
            .map(|attr| attr.unescape_value().map(|value| value.into_owned()))
            .transpose()
            .map_err(|err| ScrapeError::xml(format!("bad Season attribute: {err}")))?;
        document.seasons.push(FeedSeason {
            no,
            episodes: Vec::new(),
        });
        return Ok(());
    }

    if path.len() == SEASON_PATH.len() + 1
        && is_path(&path[..SEASON_PATH.len()], &SEASON_PATH)
        && path[SEASON_PATH.len()] == "episode"
    {
        if let Some(season) = document.seasons.last_mut() {
            season.episodes.push(FeedEpisode::default());
        }
        return Ok(());
    }

    if capture.is_none()
        && path.len() == SEASON_PATH.len() + 2
        && is_path(&path[..SEASON_PATH.len()], &SEASON_PATH)
        && path[SEASON_PATH.len()] == "episode"
    {
        let field = match path[SEASON_PATH.len() + 1].as_str() {
            "seasonnum" => EpisodeField::SeasonNum,
            "airdate" => EpisodeField::AirDate,
            _ => return Ok(()),
        };
        *capture = Some(Capture {
            field,
            depth: path.len(),
            text: String::new(),
        });
    }

    Ok(())
}

fn leave(
    path: &mut Vec<String>,
    document: &mut FeedDocument,
    capture: &mut Option<Capture>,
    root_closed: &mut bool,
) {
    if capture.as_ref().is_some_and(|c| c.depth == path.len())
        && let Some(done) = capture.take()
        && let Some(episode) = document
            .seasons
            .last_mut()
            .and_then(|season| season.episodes.last_mut())
    {
        let slot = match done.field {
            EpisodeField::SeasonNum => &mut episode.seasonnum,
            EpisodeField::AirDate => &mut episode.airdate,
        };
        // The first child of each kind wins.
        if slot.is_none() {
            *slot = Some(done.text);
        }
    }

    path.pop();
    if path.is_empty() {
        *root_closed = true;
    }
}

fn is_path(path: &[String], expected: &[&str]) -> bool {
    path.len() == expected.len() && path.iter().zip(expected).all(|(a, b)| a == b)
}
