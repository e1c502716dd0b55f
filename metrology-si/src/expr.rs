//! Grammar shared by unit expressions and dimension labels.
//!
//! ```text
//! expr     := power (('*' | '·' | '/') power)*
//! power    := atom (('**' | '^') exponent)?
//! atom     := NUMBER | IDENT | '(' expr ')'
//! exponent := ['+' | '-'] NUMBER | '(' ['+' | '-'] NUMBER ['/' NUMBER] ')'
//! ```
//!
//! An empty input is the multiplicative identity. Identifiers are resolved by the caller, so
//! the same parser builds both [`SiUnit`](crate::SiUnit)s and [`SiDimension`](crate::SiDimension)s.

use metrology_apis_core::{ConversionError, Exponent, Rational};

/// Values an expression can evaluate to.
pub(crate) trait Term: Sized {
    /// The empty product.
    fn one() -> Self;
    /// A bare numeric factor.
    fn number(value: f64) -> Result<Self, String>;
    /// `self * rhs`.
    fn times(self, rhs: Self) -> Result<Self, String>;
    /// `self / rhs`.
    fn over(self, rhs: Self) -> Result<Self, String>;
    /// `self ** exponent`.
    fn raised(self, exponent: Exponent) -> Result<Self, String>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token<'a> {
    Number(f64),
    Ident(&'a str),
    Mul,
    Div,
    Pow,
    Plus,
    Minus,
    LParen,
    RParen,
}

fn parse_error(input: &str, reason: impl Into<String>) -> ConversionError {
    ConversionError::Parse {
        input: input.to_string(),
        reason: reason.into(),
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '°'
}

fn tokenize(input: &str) -> Result<Vec<Token<'_>>, ConversionError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '*' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '*'))) {
                    chars.next();
                    tokens.push(Token::Pow);
                } else {
                    tokens.push(Token::Mul);
                }
            }
            '·' | '⋅' => {
                chars.next();
                tokens.push(Token::Mul);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Div);
            }
            '^' => {
                chars.next();
                tokens.push(Token::Pow);
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '%' => {
                chars.next();
                tokens.push(Token::Ident(&input[start..start + 1]));
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start;
                let mut seen_exp = false;
                while let Some(&(i, d)) = chars.peek() {
                    let exp_sign = seen_exp
                        && (d == '+' || d == '-')
                        && matches!(input[..i].chars().last(), Some('e' | 'E'));
                    if d.is_ascii_digit() || d == '.' || exp_sign {
                        end = i + d.len_utf8();
                        chars.next();
                    } else if (d == 'e' || d == 'E')
                        && !seen_exp
                        && exponent_follows(&input[i + 1..])
                    {
                        seen_exp = true;
                        end = i + 1;
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &input[start..end];
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| parse_error(input, format!("invalid number `{literal}`")))?;
                tokens.push(Token::Number(value));
            }
            c if is_ident_start(c) => {
                let mut end = start + c.len_utf8();
                chars.next();
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_alphabetic() || d == '_' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(&input[start..end]));
            }
            other => {
                return Err(parse_error(input, format!("unexpected character `{other}`")));
            }
        }
    }
    Ok(tokens)
}

/// `true` when the text after an `e` continues a float literal (`1e3`, `2.5e-4`).
fn exponent_follows(rest: &str) -> bool {
    let rest = rest.strip_prefix(&['+', '-'][..]).unwrap_or(rest);
    rest.starts_with(|c: char| c.is_ascii_digit())
}

struct Parser<'a, F> {
    input: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    resolve: F,
}

impl<'a, T, F> Parser<'a, F>
where
    T: Term,
    F: Fn(&str) -> Result<T, ConversionError>,
{
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, reason: impl Into<String>) -> ConversionError {
        parse_error(self.input, reason)
    }

    fn product(&mut self) -> Result<T, ConversionError> {
        let mut acc = self.power()?;
        loop {
            match self.peek() {
                Some(Token::Mul) => {
                    self.bump();
                    let rhs = self.power()?;
                    acc = acc.times(rhs).map_err(|reason| self.error(reason))?;
                }
                Some(Token::Div) => {
                    self.bump();
                    let rhs = self.power()?;
                    acc = acc.over(rhs).map_err(|reason| self.error(reason))?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn power(&mut self) -> Result<T, ConversionError> {
        let base = self.atom()?;
        if self.peek() == Some(Token::Pow) {
            self.bump();
            let exponent = self.exponent()?;
            base.raised(exponent).map_err(|reason| self.error(reason))
        } else {
            Ok(base)
        }
    }

    fn atom(&mut self) -> Result<T, ConversionError> {
        match self.bump() {
            Some(Token::Number(value)) => T::number(value).map_err(|reason| self.error(reason)),
            Some(Token::Ident(name)) => (self.resolve)(name),
            Some(Token::LParen) => {
                let inner = self.product()?;
                self.expect_close()?;
                Ok(inner)
            }
            Some(_) => Err(self.error("expected a symbol, a number or `(`")),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn exponent(&mut self) -> Result<Exponent, ConversionError> {
        if self.peek() == Some(Token::LParen) {
            self.bump();
            let numer = self.signed_number()?;
            let exponent = if self.peek() == Some(Token::Div) {
                self.bump();
                let denom = match self.bump() {
                    Some(Token::Number(d)) => d,
                    _ => return Err(self.error("expected a denominator after `/`")),
                };
                self.ratio(numer, denom)?
            } else {
                number_exponent(numer)
            };
            self.expect_close()?;
            Ok(exponent)
        } else {
            Ok(number_exponent(self.signed_number()?))
        }
    }

    fn signed_number(&mut self) -> Result<f64, ConversionError> {
        let sign = match self.peek() {
            Some(Token::Minus) => {
                self.bump();
                -1.0
            }
            Some(Token::Plus) => {
                self.bump();
                1.0
            }
            _ => 1.0,
        };
        match self.bump() {
            Some(Token::Number(value)) => Ok(sign * value),
            _ => Err(self.error("expected a numeric exponent")),
        }
    }

    fn ratio(&self, numer: f64, denom: f64) -> Result<Exponent, ConversionError> {
        let integral = |x: f64| x.fract() == 0.0 && x.abs() < 1e15;
        if !integral(numer) || !integral(denom) {
            return Err(self.error("ratio exponents must be integers"));
        }
        Rational::new(numer as i64, denom as i64)
            .map(Exponent::Rational)
            .ok_or_else(|| self.error("zero denominator in exponent"))
    }

    fn expect_close(&mut self) -> Result<(), ConversionError> {
        match self.bump() {
            Some(Token::RParen) => Ok(()),
            _ => Err(self.error("missing `)`")),
        }
    }
}

fn number_exponent(value: f64) -> Exponent {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        Exponent::Rational(Rational::integer(value as i64))
    } else {
        Exponent::Real(value)
    }
}

/// Parses `input`, resolving every identifier through `resolve`.
pub(crate) fn parse<T, F>(input: &str, resolve: F) -> Result<T, ConversionError>
where
    T: Term,
    F: Fn(&str) -> Result<T, ConversionError>,
{
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Ok(T::one());
    }
    let mut parser = Parser {
        input,
        tokens,
        pos: 0,
        resolve,
    };
    let value = parser.product()?;
    match parser.peek() {
        None => Ok(value),
        Some(Token::RParen) => Err(parser.error("unbalanced `)`")),
        Some(_) => Err(parser.error("expected an operator between terms")),
    }
}
