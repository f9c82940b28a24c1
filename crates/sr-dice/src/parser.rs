use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::lexer::Token;
use crate::roll::Roll;
use crate::term::{DiceTerm, NumericTerm, Operator, PoolTerm, Term};

type Span = SimpleSpan;

/// Parse error with source span.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Byte range of the offending input.
    pub span: std::ops::Range<usize>,
    /// Human-readable description of the parse error.
    pub message: String,
}

/// Build the formula parser.
///
/// `expr := op? atom (op operand)*`, where an operand may be a negative
/// number and an atom is dice, a number, or a `{...}` pool.
fn formula_parser<'a, I>() -> impl Parser<'a, I, Vec<Term>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = Span>,
{
    recursive(|expr| {
        let keep = select! { Token::Keep(k) => k }.labelled("keep modifier");
        let integer = select! { Token::Integer(n) => n }.labelled("number");

        let dice = select! { Token::Dice { number, faces } => (number, faces) }
            .labelled("dice")
            .then(keep.clone().or_not())
            .map(|((number, faces), keep)| {
                Term::Dice(DiceTerm::new(number.unwrap_or(1), faces, keep))
            });

        let number = integer.clone().map(|n| Term::Numeric(NumericTerm::new(n)));

        let pool = expr
            .separated_by(just(Token::Comma))
            .at_least(1)
            .collect::<Vec<Vec<Term>>>()
            .delimited_by(just(Token::LBrace), just(Token::RBrace))
            .then(keep.or_not())
            .map(|(members, keep)| {
                let rolls = members.into_iter().map(Roll::from_terms).collect();
                Term::Pool(PoolTerm::new(rolls, keep))
            })
            .labelled("pool");

        let atom = choice((dice, number, pool));

        let negative = just(Token::Minus)
            .ignore_then(integer)
            .map(|n| Term::Numeric(NumericTerm::new(-n)));
        let operand = choice((negative, atom.clone()));

        let op = choice((
            just(Token::Plus).to(Operator::Add),
            just(Token::Minus).to(Operator::Subtract),
        ))
        .labelled("operator");

        op.clone()
            .or_not()
            .then(atom)
            .then(op.then(operand).repeated().collect::<Vec<(Operator, Term)>>())
            .map(|((lead, first), rest)| {
                let mut terms = Vec::with_capacity(1 + rest.len() * 2);
                if lead == Some(Operator::Subtract) {
                    terms.push(Term::Operator(Operator::Subtract));
                }
                terms.push(first);
                for (op, term) in rest {
                    terms.push(Term::Operator(op));
                    terms.push(term);
                }
                terms
            })
    })
    .then_ignore(end())
}

/// Parse a token stream into formula terms.
pub fn parse(tokens: &[(Token, std::ops::Range<usize>)]) -> Result<Vec<Term>, Vec<ParseError>> {
    let token_iter = tokens
        .iter()
        .map(|(tok, span)| (tok.clone(), Span::from(span.clone())));

    let len = tokens.last().map_or(0, |(_, s)| s.end);
    let eoi: Span = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let (output, errors) = formula_parser().parse(stream).into_output_errors();

    if errors.is_empty() {
        if let Some(terms) = output {
            return Ok(terms);
        }
    }

    Err(errors
        .into_iter()
        .map(|e| {
            let span = e.span();
            ParseError {
                span: span.into_range(),
                message: e.to_string(),
            }
        })
        .collect())
}
