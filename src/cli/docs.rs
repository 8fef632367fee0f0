//! Documentation content for the clause CLI

use std::str::FromStr;

use super::CliError;

/// Available documentation topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum DocTopic {
    #[strum(to_string = "syntax", serialize = "grammar")]
    Syntax,
    #[strum(to_string = "operators", serialize = "ops")]
    Operators,
    #[strum(to_string = "clauses", serialize = "clause")]
    Clauses,
    #[strum(to_string = "evaluation", serialize = "eval")]
    Evaluation,
    #[strum(to_string = "facts", serialize = "fact")]
    Facts,
}

/// Get the docs overview (topic listing)
pub fn get_docs_overview() -> &'static str {
    r#"CLAUSE DOCUMENTATION

Clause conditions are short boolean sentences over named predicates, e.g.

  HasQuest(1234) and (Level >= 60 or ActorFound(5552))

A condition is split into tokens, parsed into a list of clauses joined by
and/or, and folded left to right into a single true or false.

DOCUMENTATION TOPICS

  syntax        Tokens, quoting, separators and grouping
  operators     Joins, negation and comparators
  clauses       The clause shapes and how names are recognised
  evaluation    Short-circuiting and error handling
  facts         The predicates available to 'clause check'

QUICK REFERENCE

  Name                  flag predicate
  Name OP value         variable comparison
  Name(a, b)            boolean method
  Name(a, b) OP value   method comparison
  Ns.Member [OP value]  namespace clause
  and or not ( )        joins, negation, groups
  == != < <= > >=       comparators

Run 'clause docs <topic>' for detailed documentation.
"#
}

/// Get documentation for a specific topic
pub fn get_doc_topic(name: &str) -> Result<&'static str, CliError> {
    match DocTopic::from_str(&name.replace('-', "")) {
        Ok(DocTopic::Syntax) => Ok(SYNTAX_DOC),
        Ok(DocTopic::Operators) => Ok(OPERATORS_DOC),
        Ok(DocTopic::Clauses) => Ok(CLAUSES_DOC),
        Ok(DocTopic::Evaluation) => Ok(EVALUATION_DOC),
        Ok(DocTopic::Facts) => Ok(FACTS_DOC),
        Err(_) => Err(CliError::UnknownTopic(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Tokens and Grouping

SEPARATORS
  Spaces, tabs and commas separate tokens and are dropped.
  Line endings are removed before tokenizing.

OPERATOR TOKENS
  Runs of the characters & | = ! < > ( ) are split greedily into the
  longest known operator: &&  ||  ==  !=  <=  >=  <  >  (  )
  The words and, or, not are operators too, in any letter case.

QUOTING
  'single' or "double" quotes keep spaces and commas inside one token:
    Zone == 'Stormwind Harbor'

GROUPS
  ( ... ) nests clauses. Empty groups are dropped. A group left open at the
  end of the condition is dropped with its contents. A stray ) is ignored.
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Joins, Negation and Comparators

JOINS
  and, &&     both sides must hold
  or, ||      either side may hold
  A clause with no join before it (the first in a list) counts as 'and'.

NEGATION
  not         inverts the next clause or group:
                not IsInTown
                IsDead or not (Level > 10 and HasPet)

COMPARATORS
  ==  !=  <  <=  >  >=
  Numbers compare numerically, integers and decimals mixed freely.
  Text compares case-insensitively. Booleans support == and != only.
"#;

const CLAUSES_DOC: &str = r#"CLAUSES - Shapes and Name Recognition

SHAPES
  true / false              literal
  Name                      boolean flag (BoolVariable)
  Name OP value             comparison (Variable)
  Name(args)                boolean method (BoolMethod)
  Name(args) OP value       method comparison (Method)
  Ns.Member [(args)] [OP v] namespace clause

RECOGNITION
  Variable, Method and Namespace names match exactly, ignoring case.
  BoolVariable and BoolMethod names match when the token contains the
  registered name; the longest registered name wins.

DROPPED CLAUSES
  An unknown name, a missing argument list, or a comparison without a
  valid operator and value drops that clause. The rest of the condition
  still parses. Run with --verbose to see why a clause was dropped.
"#;

const EVALUATION_DOC: &str = r#"EVALUATION - Folding Clauses

Clauses fold strictly left to right, without operator precedence:

  A or B and C     is  (A or B) and C

SHORT-CIRCUITING
  An 'or' clause reached while the result so far is true ends the fold
  with true. An 'and' clause reached while the result so far is false is
  skipped without calling its predicate.

ERRORS
  A predicate that fails, panics or is missing makes its clause false.
  The failure is logged and the fold carries on.

  An empty condition is false.
"#;

const FACTS_DOC: &str = r#"FACTS - Predicates for 'clause check'

'clause check' evaluates against a JSON object of facts:

  clause check "Fact(level) >= 60" --facts '{"level": 72}'

PREDICATES
  Fact(name) OP value     compare a scalar fact
  HasFact(name)           the fact exists
  IsSet(name)             the fact exists and is truthy
  Matches(name, pattern)  a scalar fact matches a regular expression
  Contains(name, item)    an array holds item, an object has key item,
                          or a string contains item
  Facts.name [OP value]   compare a fact, or test it for truthiness

Fact names match exactly first, then ignoring case.
"#;
