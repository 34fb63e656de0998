use super::{Message, ParseError, Tag};

/// Parses one protocol line into a [`Message`].
///
/// A trailing CR/LF is tolerated. The only hard failure is a missing command;
/// everything else that is malformed just yields fewer tags or parameters.
pub fn parse_message(line: &str) -> Result<Message, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let (tags, rest) = parse_tags(line);
    let (prefix, rest) = parse_prefix(rest);
    let (command, rest) = parse_command(rest)?;
    let (params, trailing) = parse_params(rest);
    let nick = prefix.as_deref().and_then(prefix_to_nick);

    Ok(Message {
        tags,
        prefix,
        nick,
        command,
        params,
        trailing,
    })
}

fn parse_tags(line: &str) -> (Vec<Tag>, &str) {
    let Some(body) = line.strip_prefix('@') else {
        return (Vec::new(), line);
    };
    let (block, rest) = body.split_once(' ').unwrap_or((body, ""));
    let tags = block.split(';').filter_map(parse_tag).collect();
    (tags, rest)
}

fn parse_tag(token: &str) -> Option<Tag> {
    // "key", "key=" and "key=value"; the key never keeps the '='
    let (key, value) = token.split_once('=').unwrap_or((token, ""));
    if key.is_empty() {
        return None;
    }
    Some(Tag {
        key: key.to_string(),
        value: unescape_tag_value(value),
    })
}

fn parse_prefix(rest: &str) -> (Option<String>, &str) {
    let rest = rest.trim_start_matches(' ');
    match rest.strip_prefix(':') {
        Some(body) => {
            let (prefix, rest) = body.split_once(' ').unwrap_or((body, ""));
            (Some(prefix.to_string()), rest)
        }
        None => (None, rest),
    }
}

fn prefix_to_nick(prefix: &str) -> Option<String> {
    prefix.split_once('!').map(|(nick, _)| nick.to_string())
}

fn parse_command(rest: &str) -> Result<(String, &str), ParseError> {
    let rest = rest.trim_start_matches(' ');
    let (command, rest) = rest.split_once(' ').unwrap_or((rest, ""));
    if command.is_empty() {
        return Err(ParseError::MissingCommand);
    }
    Ok((command.to_string(), rest))
}

fn parse_params(mut rest: &str) -> (Vec<String>, Option<usize>) {
    let mut params = Vec::new();
    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            return (params, None);
        }
        if let Some(trailing) = rest.strip_prefix(':') {
            let index = params.len();
            params.push(trailing.to_string());
            return (params, Some(index));
        }
        let (param, remainder) = rest.split_once(' ').unwrap_or((rest, ""));
        params.push(param.to_string());
        rest = remainder;
    }
}

/// Reverses IRCv3 tag value escaping.
///
/// Unknown escapes and a dangling backslash are kept verbatim.
pub fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        let replacement = match chars.peek() {
            Some(':') => ';',
            Some('s') => ' ',
            Some('\\') => '\\',
            Some('r') => '\r',
            Some('n') => '\n',
            _ => {
                unescaped.push(c);
                continue;
            }
        };
        chars.next();
        unescaped.push(replacement);
    }
    unescaped
}
