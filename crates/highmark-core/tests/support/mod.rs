//! Grammar-aware parser for the emitted markup, used to verify structure.
//!
//! Substring assertions pass on malformed output (unbalanced wrappers,
//! wrong nesting order), so the emit and property tests parse the markup
//! back into a tree and assert on that instead. Only the two wrapper
//! families of the output grammar exist here; anything else is literal
//! text.
#![allow(dead_code)]

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
    Wrapper(Wrapper),
    Text(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Wrapper {
    pub kind: WrapperKind,
    pub color: String,
    pub thickness_pt: Option<u32>,
    pub offset_pt: Option<u32>,
    pub extent: bool,
    pub children: Vec<Node>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WrapperKind {
    Fill,
    Underline,
}

/// Parses emitted markup. Any unbalanced bracket, unknown command, or
/// malformed argument list is an error; balance is not assumed, it is
/// checked.
pub fn parse_markup(input: &str) -> Result<Vec<Node>, String> {
    let mut parser = Parser { input, pos: 0 };
    parser.parse_nodes(0)
}

/// Literal text of all leaves, escapes resolved, in document order.
pub fn plain_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    collect_text(nodes, &mut out);
    out
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Wrapper(wrapper) => collect_text(&wrapper.children, out),
        }
    }
}

pub fn count_wrappers(nodes: &[Node], kind: WrapperKind) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            Node::Text(_) => 0,
            Node::Wrapper(wrapper) => {
                usize::from(wrapper.kind == kind) + count_wrappers(&wrapper.children, kind)
            }
        })
        .sum()
}

pub fn max_depth(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            Node::Text(_) => 0,
            Node::Wrapper(wrapper) => 1 + max_depth(&wrapper.children),
        })
        .max()
        .unwrap_or(0)
}

/// Depth-first walk over every wrapper in the tree.
pub fn wrappers(nodes: &[Node]) -> Vec<&Wrapper> {
    let mut out = Vec::new();
    for node in nodes {
        if let Node::Wrapper(wrapper) = node {
            out.push(wrapper);
            out.extend(wrappers(&wrapper.children));
        }
    }
    out
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat_str(&mut self, prefix: &str) -> bool {
        if self.input[self.pos..].starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn parse_nodes(&mut self, depth: usize) -> Result<Vec<Node>, String> {
        let mut nodes = Vec::new();
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            match ch {
                ']' => {
                    if depth == 0 {
                        return Err(format!("unbalanced ']' at byte {}", self.pos));
                    }
                    break;
                }
                '\\' => {
                    self.bump();
                    match self.bump() {
                        Some(escaped) => text.push(escaped),
                        None => return Err("dangling backslash at end of input".to_string()),
                    }
                }
                '#' => {
                    if !text.is_empty() {
                        nodes.push(Node::Text(std::mem::take(&mut text)));
                    }
                    nodes.push(Node::Wrapper(self.parse_wrapper(depth)?));
                }
                _ => {
                    text.push(ch);
                    self.bump();
                }
            }
        }
        if !text.is_empty() {
            nodes.push(Node::Text(text));
        }
        Ok(nodes)
    }

    fn parse_wrapper(&mut self, depth: usize) -> Result<Wrapper, String> {
        let at = self.pos;
        let kind = if self.eat_str("#highlight(") {
            WrapperKind::Fill
        } else if self.eat_str("#underline(") {
            WrapperKind::Underline
        } else {
            return Err(format!("unknown command at byte {}", at));
        };

        let args = self.take_args()?;
        let mut wrapper = match kind {
            WrapperKind::Fill => parse_fill_args(&args)?,
            WrapperKind::Underline => parse_underline_args(&args)?,
        };

        if self.bump() != Some('[') {
            return Err(format!("expected '[' after arguments at byte {}", self.pos));
        }
        wrapper.children = self.parse_nodes(depth + 1)?;
        if self.bump() != Some(']') {
            return Err(format!("unclosed wrapper opened at byte {}", at));
        }
        Ok(wrapper)
    }

    fn take_args(&mut self) -> Result<String, String> {
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(ch) = self.peek() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        let args = self.input[start..self.pos].to_string();
                        self.bump();
                        return Ok(args);
                    }
                }
                _ => {}
            }
            self.bump();
        }
        Err(format!("unterminated argument list at byte {}", start))
    }
}

fn parse_fill_args(args: &str) -> Result<Wrapper, String> {
    let rest = args
        .strip_prefix("fill: rgb(\"")
        .ok_or_else(|| format!("malformed fill arguments: {:?}", args))?;
    let (color, rest) = rest
        .split_once("\")")
        .ok_or_else(|| format!("malformed fill color: {:?}", args))?;
    let extent = match rest {
        "" => false,
        ", extent: 2pt" => true,
        _ => return Err(format!("unexpected fill arguments: {:?}", args)),
    };
    Ok(Wrapper {
        kind: WrapperKind::Fill,
        color: color.to_string(),
        thickness_pt: None,
        offset_pt: None,
        extent,
        children: Vec::new(),
    })
}

fn parse_underline_args(args: &str) -> Result<Wrapper, String> {
    let rest = args
        .strip_prefix("stroke: ")
        .ok_or_else(|| format!("malformed underline arguments: {:?}", args))?;
    let (thickness, rest) = rest
        .split_once("pt + rgb(\"")
        .ok_or_else(|| format!("malformed underline stroke: {:?}", args))?;
    let (color, rest) = rest
        .split_once("\"), offset: ")
        .ok_or_else(|| format!("malformed underline color: {:?}", args))?;
    let offset = rest
        .strip_suffix("pt")
        .ok_or_else(|| format!("malformed underline offset: {:?}", args))?;
    Ok(Wrapper {
        kind: WrapperKind::Underline,
        color: color.to_string(),
        thickness_pt: Some(
            thickness
                .parse()
                .map_err(|_| format!("non-numeric thickness: {:?}", args))?,
        ),
        offset_pt: Some(
            offset
                .parse()
                .map_err(|_| format!("non-numeric offset: {:?}", args))?,
        ),
        extent: false,
        children: Vec::new(),
    })
}
