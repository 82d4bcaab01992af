//! Recursive-descent parser producing [`Expr`] trees

use super::ast::{ArithOp, CompareOp, Expr};
use super::error::ExprError;
use super::lexer::{Token, tokenize};
use super::value::Value;

/// Maximum nesting depth accepted by the parser
pub const MAX_DEPTH: usize = 64;

/// Maximum expression length in bytes
pub const MAX_LEN: usize = 4096;

/// Parse an expression string.
pub fn parse(input: &str) -> Result<Expr, ExprError> {
    if input.len() > MAX_LEN {
        return Err(ExprError::TooLong(MAX_LEN));
    }
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(ExprError::UnexpectedToken(token.describe())),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ExprError> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(ExprError::UnexpectedToken(token.describe())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn enter(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr, ExprError> {
        self.enter()?;
        let result = self.ternary();
        self.depth -= 1;
        result
    }

    fn ternary(&mut self) -> Result<Expr, ExprError> {
        let then = self.or_expr()?;
        if !self.eat(&Token::If) {
            return Ok(then);
        }
        let cond = self.or_expr()?;
        self.expect(Token::Else)?;
        let otherwise = self.expr()?;
        Ok(Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn or_expr(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::Or) {
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.not_expr()?;
        while self.eat(&Token::And) {
            let right = self.not_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Not) {
            self.enter()?;
            let inner = self.not_expr();
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner?)));
        }
        self.comparison()
    }

    fn compare_op(&mut self) -> Option<CompareOp> {
        let op = match self.peek()? {
            Token::EqEq => CompareOp::Eq,
            Token::NotEq => CompareOp::NotEq,
            Token::Lt => CompareOp::Lt,
            Token::Le => CompareOp::Le,
            Token::Gt => CompareOp::Gt,
            Token::Ge => CompareOp::Ge,
            Token::In => CompareOp::In,
            Token::Not if self.peek_at(1) == Some(&Token::In) => {
                self.pos += 2;
                return Some(CompareOp::NotIn);
            }
            _ => return None,
        };
        self.pos += 1;
        Some(op)
    }

    fn comparison(&mut self) -> Result<Expr, ExprError> {
        let first = self.additive()?;
        let mut links = Vec::new();
        while let Some(op) = self.compare_op() {
            links.push((op, self.additive()?));
        }
        if links.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare(Box::new(first), links))
        }
    }

    fn additive(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithOp::Add,
                Some(Token::Minus) => ArithOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.term()?;
            left = Expr::Arith(op, Box::new(left), Box::new(right));
        }
    }

    fn term(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => ArithOp::Mul,
                Some(Token::Slash) => ArithOp::Div,
                Some(Token::Percent) => ArithOp::Rem,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Arith(op, Box::new(left), Box::new(right));
        }
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Minus) {
            self.enter()?;
            let inner = self.unary();
            self.depth -= 1;
            return Ok(Expr::Neg(Box::new(inner?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Literal(Value::Number(n))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::Str(s))),
            Some(Token::True) => Ok(Expr::Literal(Value::Bool(true))),
            Some(Token::False) => Ok(Expr::Literal(Value::Bool(false))),
            Some(Token::Null) => Ok(Expr::Literal(Value::Null)),
            Some(Token::Ident(name)) => Ok(Expr::Var(name)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::LBracket) => {
                let mut items = Vec::new();
                if !self.eat(&Token::RBracket) {
                    loop {
                        items.push(self.expr()?);
                        if self.eat(&Token::Comma) {
                            continue;
                        }
                        self.expect(Token::RBracket)?;
                        break;
                    }
                }
                Ok(Expr::List(items))
            }
            Some(token) => Err(ExprError::UnexpectedToken(token.describe())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::Var(name.into()))
    }

    fn num(n: f64) -> Expr {
        Expr::Literal(Value::Number(n))
    }

    #[test]
    fn parses_simple_comparison() {
        let expr = parse("business_knowledge_level <= 2").unwrap();
        assert_eq!(
            expr,
            Expr::Compare(var("business_knowledge_level"), vec![(CompareOp::Le, num(2.0))])
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse("a or b and c").unwrap();
        assert_eq!(
            expr,
            Expr::Or(var("a"), Box::new(Expr::And(var("b"), var("c"))))
        );
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse("a + b * 2").unwrap();
        assert_eq!(
            expr,
            Expr::Arith(
                ArithOp::Add,
                var("a"),
                Box::new(Expr::Arith(ArithOp::Mul, var("b"), Box::new(num(2.0))))
            )
        );
    }

    #[test]
    fn parses_not_in() {
        let expr = parse("stage not in ['idea', 'concept']").unwrap();
        match expr {
            Expr::Compare(_, links) => assert_eq!(links[0].0, CompareOp::NotIn),
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn parses_conditional() {
        let expr = parse("'high' if score > 3 else 'low'").unwrap();
        assert!(matches!(expr, Expr::Conditional { .. }));
    }

    #[test]
    fn rejects_trailing_tokens() {
        assert!(matches!(
            parse("a == 1 2"),
            Err(ExprError::UnexpectedToken(_))
        ));
    }

    #[test]
    fn rejects_python_statements() {
        assert!(parse("if management_roles > 2: return \"x\"").is_err());
    }

    #[test]
    fn rejects_function_calls() {
        assert!(parse("extract_industry_experience(work_history)").is_err());
    }

    #[test]
    fn rejects_incomplete_expression() {
        assert_eq!(parse("a >="), Err(ExprError::UnexpectedEnd));
    }

    #[test]
    fn limits_nesting_depth() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(parse(&deep), Err(ExprError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn limits_negation_depth() {
        let deep = format!("{}1", "-".repeat(MAX_DEPTH * 2));
        assert_eq!(parse(&deep), Err(ExprError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn limits_expression_length() {
        let long = vec!["a"; MAX_LEN].join(" + ");
        assert_eq!(parse(&long), Err(ExprError::TooLong(MAX_LEN)));
    }

    #[test]
    fn collects_identifiers() {
        let expr = parse("current_savings / monthly_expenses").unwrap();
        let names: Vec<_> = expr.identifiers().into_iter().collect();
        assert_eq!(names, vec!["current_savings", "monthly_expenses"]);
    }
}
