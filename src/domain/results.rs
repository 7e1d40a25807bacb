/// Score triple derived from a result code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultScores {
    pub white: f64,
    pub black: f64,
    pub walkover: bool,
}

/// The five result codes a referee can record. Anything else is a
/// validation error and never reaches the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResultCode {
    WhiteWins,
    Draw,
    BlackWins,
    WalkoverWhite,
    WalkoverBlack,
}

impl MatchResultCode {
    pub fn parse(code: &str) -> Option<MatchResultCode> {
        match code {
            "1-0" => Some(MatchResultCode::WhiteWins),
            "0.5-0.5" => Some(MatchResultCode::Draw),
            "0-1" => Some(MatchResultCode::BlackWins),
            "wo-white" => Some(MatchResultCode::WalkoverWhite),
            "wo-black" => Some(MatchResultCode::WalkoverBlack),
            _ => None,
        }
    }

    pub fn scores(&self) -> ResultScores {
        match self {
            MatchResultCode::WhiteWins => ResultScores {
                white: 1.0,
                black: 0.0,
                walkover: false,
            },
            MatchResultCode::Draw => ResultScores {
                white: 0.5,
                black: 0.5,
                walkover: false,
            },
            MatchResultCode::BlackWins => ResultScores {
                white: 0.0,
                black: 1.0,
                walkover: false,
            },
            MatchResultCode::WalkoverWhite => ResultScores {
                white: 1.0,
                black: 0.0,
                walkover: true,
            },
            MatchResultCode::WalkoverBlack => ResultScores {
                white: 0.0,
                black: 1.0,
                walkover: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_the_five_codes() {
        let cases = [
            ("1-0", (1.0, 0.0, false)),
            ("0.5-0.5", (0.5, 0.5, false)),
            ("0-1", (0.0, 1.0, false)),
            ("wo-white", (1.0, 0.0, true)),
            ("wo-black", (0.0, 1.0, true)),
        ];
        for (code, (white, black, walkover)) in cases {
            let scores = MatchResultCode::parse(code).unwrap().scores();
            assert_eq!(scores.white, white, "{}", code);
            assert_eq!(scores.black, black, "{}", code);
            assert_eq!(scores.walkover, walkover, "{}", code);
            assert_eq!(scores.white + scores.black, 1.0, "{}", code);
        }
    }

    #[test]
    fn rejects_unknown_codes() {
        assert_eq!(MatchResultCode::parse(""), None);
        assert_eq!(MatchResultCode::parse("2-0"), None);
        assert_eq!(MatchResultCode::parse("wo"), None);
        assert_eq!(MatchResultCode::parse("1 - 0"), None);
    }
}
