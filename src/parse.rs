use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, space0},
    combinator::{all_consuming, map},
    multi::separated_list0,
    sequence::{delimited, preceded, separated_pair, terminated},
    IResult,
};
use tracing::debug;

use crate::{
    error::ParseError,
    module::{Module, ModuleKind},
    network::Network,
};

type ModuleLine<'a> = ((ModuleKind, &'a str), Vec<&'a str>);

fn name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn declaration(input: &str) -> IResult<&str, (ModuleKind, &str)> {
    alt((
        map(preceded(char('%'), name), |n| (ModuleKind::FlipFlop, n)),
        map(preceded(char('&'), name), |n| (ModuleKind::Conjunction, n)),
        map(name, |n| (ModuleKind::Broadcaster, n)),
    ))(input)
}

fn outputs(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list0(delimited(space0, char(','), space0), name)(input)
}

fn module_line(input: &str) -> IResult<&str, ModuleLine> {
    separated_pair(
        declaration,
        delimited(space0, tag("->"), space0),
        terminated(outputs, space0),
    )(input)
}

/// Parses one module per line, up to the first blank line, and wires up the
/// conjunction memories.
pub fn parse_network(input: &str) -> Result<Network, ParseError> {
    let mut network = Network::new();

    for (i, line) in input.lines().enumerate() {
        let line = line.trim();
        let lineno = i + 1;

        if line.is_empty() {
            if network.is_empty() {
                continue;
            }
            break;
        }

        if !line.contains("->") {
            return Err(ParseError::MissingArrow {
                line: lineno,
                text: line.to_string(),
            });
        }

        if let Some(prefix) = line.chars().next() {
            if !(prefix == '%' || prefix == '&' || prefix.is_ascii_alphanumeric()) {
                return Err(ParseError::UnknownPrefix {
                    line: lineno,
                    prefix,
                });
            }
        }

        let Ok((_, ((kind, name), dests))) = all_consuming(module_line)(line) else {
            return Err(ParseError::Syntax {
                line: lineno,
                text: line.to_string(),
            });
        };

        let dests = dests.into_iter().map(String::from).collect();
        let module = match kind {
            ModuleKind::FlipFlop => Module::flip_flop(name, dests),
            ModuleKind::Conjunction => Module::conjunction(name, dests),
            ModuleKind::Broadcaster | ModuleKind::Sink => Module::broadcaster(name, dests),
        };

        if network.insert(module).is_some() {
            return Err(ParseError::DuplicateModule {
                line: lineno,
                name: name.to_string(),
            });
        }
    }

    network.connect_conjunction_inputs();
    debug!(modules = network.len(), "parsed network");

    Ok(network)
}

impl FromStr for Network {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_network(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::module::{BROADCASTER, LOW};

    #[test]
    fn test_parse_kinds() {
        let network = parse_network(
            "broadcaster -> a, b, c
            %a -> b
            %b -> c
            %c -> inv
            &inv -> a",
        )
        .unwrap();

        assert_eq!(network.len(), 5);
        assert_eq!(
            network.get(BROADCASTER),
            Some(&Module::broadcaster(
                BROADCASTER,
                vec!["a".into(), "b".into(), "c".into()]
            ))
        );
        assert_eq!(network.get("a").map(|m| m.kind()), Some(ModuleKind::FlipFlop));
        assert_eq!(
            network.get("inv").map(|m| m.kind()),
            Some(ModuleKind::Conjunction)
        );
        assert_eq!(
            network.get("inv").unwrap().outputs(),
            &["a".to_string()][..]
        );
    }

    #[test]
    fn test_parse_connects_conjunction_inputs() {
        let network = parse_network(
            "broadcaster -> a
            %a -> inv, con
            &inv -> b
            %b -> con
            &con -> output",
        )
        .unwrap();

        let states = network.states();
        assert_eq!(
            states.conjunctions["con"],
            BTreeMap::from([("a".to_string(), LOW), ("b".to_string(), LOW)])
        );
        assert_eq!(
            states.conjunctions["inv"],
            BTreeMap::from([("a".to_string(), LOW)])
        );
        assert!(!network.contains("output"));
    }

    #[test]
    fn test_parse_stops_at_blank_line() {
        let network = parse_network("\nbroadcaster -> a\n%a -> b\n\n%b -> a\n").unwrap();

        assert_eq!(network.len(), 2);
        assert!(!network.contains("b"));
    }

    #[test]
    fn test_parse_whitespace_and_empty_outputs() {
        let network: Network = "broadcaster->a ,b\n%a -> \n&b ->".parse().unwrap();

        assert_eq!(
            network.get(BROADCASTER).unwrap().outputs(),
            &["a".to_string(), "b".to_string()][..]
        );
        assert!(network.get("a").unwrap().outputs().is_empty());
        assert!(network.get("b").unwrap().outputs().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_network("broadcaster -> a\n%a b"),
            Err(ParseError::MissingArrow {
                line: 2,
                text: "%a b".into()
            })
        );
        assert_eq!(
            parse_network("broadcaster -> a\n#a -> b"),
            Err(ParseError::UnknownPrefix {
                line: 2,
                prefix: '#'
            })
        );
        assert_eq!(
            parse_network("broadcaster -> a -> b"),
            Err(ParseError::Syntax {
                line: 1,
                text: "broadcaster -> a -> b".into()
            })
        );
        assert_eq!(
            parse_network("% -> b"),
            Err(ParseError::Syntax {
                line: 1,
                text: "% -> b".into()
            })
        );
        assert_eq!(
            parse_network("broadcaster -> a, b,"),
            Err(ParseError::Syntax {
                line: 1,
                text: "broadcaster -> a, b,".into()
            })
        );
        assert_eq!(
            parse_network("%a -> b\n&a -> c"),
            Err(ParseError::DuplicateModule {
                line: 2,
                name: "a".into()
            })
        );
    }
}
