use crate::request::ServiceRequest;
use std::sync::Arc;

type AcceptFn = Arc<dyn Fn(&ServiceRequest) -> Vec<String> + Send + Sync>;

/// The content types a definition can serve: a fixed list, or a callable
/// computing the list from the request.
#[derive(Clone)]
pub enum Acceptable {
    Fixed(Vec<String>),
    Dynamic(AcceptFn),
}

impl Acceptable {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&ServiceRequest) -> Vec<String> + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(f))
    }

    pub(crate) fn resolve(&self, request: &ServiceRequest) -> Vec<String> {
        match self {
            Self::Fixed(types) => types.clone(),
            Self::Dynamic(f) => f(request),
        }
    }

    pub(crate) fn as_fixed(&self) -> Option<&[String]> {
        match self {
            Self::Fixed(types) => Some(types),
            Self::Dynamic(_) => None,
        }
    }
}

impl From<&str> for Acceptable {
    fn from(value: &str) -> Self {
        Self::Fixed(vec![value.to_string()])
    }
}

impl From<String> for Acceptable {
    fn from(value: String) -> Self {
        Self::Fixed(vec![value])
    }
}

impl From<Vec<String>> for Acceptable {
    fn from(value: Vec<String>) -> Self {
        Self::Fixed(value)
    }
}

impl From<Vec<&str>> for Acceptable {
    fn from(value: Vec<&str>) -> Self {
        Self::Fixed(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Acceptable {
    fn from(value: [&str; N]) -> Self {
        Self::Fixed(value.into_iter().map(str::to_string).collect())
    }
}

struct MediaRange {
    kind: String,
    subtype: String,
    /// q-value scaled to thousandths, 0..=1000.
    quality: u16,
}

impl MediaRange {
    fn matches(&self, kind: &str, subtype: &str) -> bool {
        (self.kind == "*" || self.kind == kind) && (self.subtype == "*" || self.subtype == subtype)
    }

    fn specificity(&self) -> u8 {
        match (self.kind.as_str(), self.subtype.as_str()) {
            ("*", _) => 0,
            (_, "*") => 1,
            _ => 2,
        }
    }
}

fn parse_accept(header: &str) -> Vec<MediaRange> {
    header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let range = pieces.next()?.trim();
            let (kind, subtype) = range.split_once('/')?;
            let kind = kind.trim().to_ascii_lowercase();
            let subtype = subtype.trim().to_ascii_lowercase();
            if kind.is_empty() || subtype.is_empty() {
                return None;
            }
            let mut quality = 1000;
            for param in pieces {
                if let Some(q) = param.trim().strip_prefix("q=") {
                    let parsed = q.trim().parse::<f32>().unwrap_or(0.0);
                    quality = (parsed.clamp(0.0, 1.0) * 1000.0).round() as u16;
                }
            }
            Some(MediaRange {
                kind,
                subtype,
                quality,
            })
        })
        .collect()
}

/// Pick the offered content type the Accept header prefers most.
///
/// Matching follows the usual media-range rules: an exact `type/subtype`
/// match, a `type/*` match, or `*/*`. Higher q wins; at equal q the more
/// specific range wins, then the earlier offer. Ranges with `q=0` and
/// malformed header parts are ignored. Returns `None` when nothing offered
/// is acceptable.
pub fn best_match(header: &str, offered: &[String]) -> Option<String> {
    let ranges = parse_accept(header);
    if ranges.is_empty() {
        return None;
    }

    let mut best: Option<(u16, u8, usize)> = None;
    for (index, offer) in offered.iter().enumerate() {
        let Some((kind, subtype)) = offer.split_once('/') else {
            continue;
        };
        let kind = kind.trim().to_ascii_lowercase();
        let subtype = subtype.trim().to_ascii_lowercase();
        for range in &ranges {
            if range.quality == 0 || !range.matches(&kind, &subtype) {
                continue;
            }
            let candidate = (range.quality, range.specificity(), index);
            let better = match best {
                None => true,
                Some((q, s, i)) => {
                    candidate.0 > q
                        || (candidate.0 == q && candidate.1 > s)
                        || (candidate.0 == q && candidate.1 == s && candidate.2 < i)
                }
            };
            if better {
                best = Some(candidate);
            }
        }
    }

    best.map(|(_, _, index)| offered[index].clone())
}
