//! Local mock review generator.
//!
//! Never fails and performs no network I/O. Shallow code metrics pick a
//! markdown template per (style, complexity) so the output stays
//! plausible; an artificial delay emulates upstream latency. Output is
//! deterministic apart from that delay.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use utoipa::ToSchema;

use super::{AiError, GeneratedReview, ReviewGenerator, ReviewMetadata};
use crate::config::MOCK_REVIEW_DELAY;
use crate::domain::{Language, ReviewStyle};

/// Complexity bucket derived from line count and nesting depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        }
    }
}

/// Shallow metrics extracted from a code submission
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeMetrics {
    pub line_count: usize,
    pub char_count: usize,
    pub has_comments: bool,
    pub has_functions: bool,
    pub has_classes: bool,
    pub has_imports: bool,
    pub complexity: Complexity,
}

impl CodeMetrics {
    /// Analyze a code submission with cheap textual heuristics
    pub fn analyze(code: &str) -> Self {
        let line_count = code.lines().count();
        let char_count = code.len();

        let has_comments = code.contains("//") || code.contains("/*") || code.contains('#');
        let has_functions =
            code.contains("function") || code.contains("=>") || code.contains("fn ") || code.contains("def ");
        let has_classes = code.contains("class ");
        let has_imports =
            code.contains("import ") || code.contains("require(") || code.contains("use ");

        let nesting = max_nesting(code);
        let complexity = if line_count > 100 || nesting > 5 {
            Complexity::Complex
        } else if line_count > 30 || nesting > 3 {
            Complexity::Moderate
        } else {
            Complexity::Simple
        };

        Self {
            line_count,
            char_count,
            has_comments,
            has_functions,
            has_classes,
            has_imports,
            complexity,
        }
    }
}

/// Rough maximum bracket-nesting depth
fn max_nesting(code: &str) -> usize {
    let mut max_depth = 0usize;
    let mut current = 0usize;

    for c in code.chars() {
        match c {
            '{' | '(' | '[' => {
                current += 1;
                max_depth = max_depth.max(current);
            }
            '}' | ')' | ']' => {
                current = current.saturating_sub(1);
            }
            _ => {}
        }
    }

    max_depth
}

/// Mock generator with configurable artificial latency.
pub struct MockGenerator {
    delay: Duration,
}

impl MockGenerator {
    /// Generator with the default artificial delay
    pub fn new() -> Self {
        Self {
            delay: MOCK_REVIEW_DELAY,
        }
    }

    /// Generator with an explicit delay (zero for tests)
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    /// Render the review template for the given metrics and style
    fn render(metrics: &CodeMetrics, language: Language, style: ReviewStyle) -> String {
        let template = match (style, metrics.complexity) {
            (ReviewStyle::Concise, Complexity::Simple) => CONCISE_SIMPLE,
            (ReviewStyle::Concise, Complexity::Moderate) => CONCISE_MODERATE,
            (ReviewStyle::Concise, Complexity::Complex) => CONCISE_COMPLEX,
            (ReviewStyle::Detailed, Complexity::Simple) => DETAILED_SIMPLE,
            (ReviewStyle::Detailed, Complexity::Moderate) => DETAILED_MODERATE,
            (ReviewStyle::Detailed, Complexity::Complex) => DETAILED_COMPLEX,
        };

        let mut review = template
            .replace("{language}", language.as_str())
            .replace("{lineCount}", &metrics.line_count.to_string())
            .replace("{complexity}", metrics.complexity.as_str());

        if !metrics.has_comments {
            review.push_str(
                "\n\n**Missing Comments**: The code lacks proper documentation. \
                 Consider adding comments to explain complex logic.",
            );
        }

        if metrics.has_classes && metrics.complexity != Complexity::Simple {
            review.push_str(
                "\n\n**Class Design**: Consider reviewing your class structure for \
                 better encapsulation and separation of concerns.",
            );
        }

        review
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewGenerator for MockGenerator {
    async fn generate(
        &self,
        code: &str,
        language: Language,
        style: ReviewStyle,
    ) -> Result<GeneratedReview, AiError> {
        tracing::debug!(language = %language, style = %style, "Generating mock review");

        let metrics = CodeMetrics::analyze(code);
        let review = Self::render(&metrics, language, style);

        // Emulate upstream latency
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(GeneratedReview {
            review,
            metadata: ReviewMetadata {
                language,
                review_style: style,
                model: "mock".to_string(),
                is_mock: true,
                fallback: false,
                downgraded: false,
                metrics: Some(metrics),
            },
        })
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn model_name(&self) -> &str {
        "mock"
    }

    fn is_mock(&self) -> bool {
        true
    }
}

// --- review templates -------------------------------------------------------

const CONCISE_SIMPLE: &str = "## Code Review Summary

* **Overall Quality**: Generally good, with minor issues
* **Key Points**:
  * Simple {language} implementation
  * Good basic structure for {lineCount} lines of code
  * Clean and readable

**Suggestions:**
1. Add error handling for edge cases
2. Consider adding more comments for clarity
3. Add unit tests for validation";

const CONCISE_MODERATE: &str = "## Code Review Summary

* **Overall Quality**: Moderate complexity with some concerns
* **Key Issues**:
  * Missing error handling in key functions
  * Potential for code duplication in several areas
  * Some naming could be more descriptive

**Suggested Fixes:**
1. Add error handling around critical operations
2. Extract repeated logic into helper functions
3. Improve variable naming for better readability
4. Add input validation to prevent unexpected behavior";

const CONCISE_COMPLEX: &str = "## Code Review Summary

* **Overall Quality**: Complex codebase with significant issues
* **Critical Concerns**:
  * High cyclomatic complexity in multiple functions
  * Lack of proper error boundaries
  * Potential performance bottlenecks
  * Security vulnerabilities in data handling

**Priority Fixes:**
1. Refactor large functions into smaller, more manageable pieces
2. Implement comprehensive error handling strategy
3. Add input validation and sanitization
4. Review performance-critical sections for optimization";

const DETAILED_SIMPLE: &str = "# Code Review: {language} Implementation

## Code Quality and Best Practices
- Overall well-structured and clean {language} code
- Good use of standard practices for this simple implementation
- Variable naming is generally clear and descriptive
- Code is concise at {lineCount} lines

## Potential Issues
- Error handling could be improved for edge cases
- Some functions could benefit from additional input validation
- Consider adding parameter type checking

## Performance Considerations
- No significant performance concerns for this simple implementation
- Standard {language} operations used appropriately

## Security Considerations
- No major security concerns identified in this simple code
- Always validate user inputs in production environments

## Suggestions for Improvement
1. Add basic error handling around failure-prone operations
2. Consider documenting the public entry points
3. Add unit tests for full coverage
4. Consider adding type validation for function parameters

Overall, this is a solid implementation with good foundational practices. \
The suggestions above would help make this production-ready.";

const DETAILED_MODERATE: &str = "# Comprehensive Code Review: {language}

## Code Quality and Best Practices
- Moderately complex {language} code with reasonable organization
- Some functions follow best practices, while others need improvement
- Variable naming is inconsistent in some areas
- Code structure shows understanding of {language} patterns

## Potential Bugs and Issues
- Several edge cases are not handled properly
- Potential null/undefined references not checked
- Error propagation is inconsistent throughout the codebase
- Some conditionals could lead to unexpected behavior

## Performance Considerations
- Several areas could benefit from optimization:
  * Repeated calculations could be memoized
  * Some loops could be optimized or combined
  * Consider more efficient data structures for key operations

## Security Concerns
- Input validation is missing in several critical areas
- Potential for injection vulnerabilities if handling user input
- Data sanitization should be implemented throughout

## Suggestions for Improvement
1. Implement consistent error handling strategy
2. Add comprehensive input validation
3. Standardize coding patterns across the codebase
4. Consider extracting common functionality into reusable utilities
5. Add thorough comments for complex logic sections
6. Implement unit tests for all significant functions

This code has a good foundation but would benefit from refactoring to \
address the issues noted above before using in production.";

const DETAILED_COMPLEX: &str = "# Detailed Code Review: Complex {language} Implementation

## Code Quality and Best Practices
- Complex codebase with mixed adherence to {language} best practices
- File organization needs improvement - consider breaking into modules
- Naming conventions are inconsistent across components
- Documentation is insufficient for the level of complexity
- Some patterns are well-implemented while others need significant refactoring

## Potential Bugs and Issues
- High cyclomatic complexity increases risk of bugs in multiple functions
- Error handling is incomplete or missing in critical sections
- Race conditions possible in asynchronous operations
- Multiple edge cases not addressed
- Type inconsistencies could lead to unexpected behavior

## Performance Considerations
- Several performance bottlenecks identified:
  * Inefficient algorithms in critical paths
  * Unnecessary re-computations
  * Suboptimal data structures for key operations
  * Potential memory leaks from unmanaged resources
- Consider profiling and benchmarking key functions

## Security Concerns
- Multiple security vulnerabilities detected:
  * Improper input validation
  * Potential for injection attacks
  * Insecure data handling practices
  * Missing authorization checks
- Security audit strongly recommended

## Architecture Recommendations
- Consider restructuring using more appropriate design patterns
- Implement proper separation of concerns
- Add abstraction layers where appropriate
- Improve modularity for better maintainability

## Suggestions for Improvement
1. Comprehensive refactoring plan focusing on high-risk areas first
2. Implement thorough error handling strategy
3. Add extensive unit and integration tests
4. Improve documentation of the public surface
5. Conduct security review and implement fixes
6. Optimize identified performance bottlenecks
7. Consider stricter type checking for increased safety

This complex codebase requires significant refactoring to meet production \
standards. Recommend tackling issues incrementally, starting with the most \
critical concerns.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_simple_snippet() {
        let metrics = CodeMetrics::analyze("let x = 1;\nlet y = 2;");

        assert_eq!(metrics.line_count, 2);
        assert_eq!(metrics.complexity, Complexity::Simple);
        assert!(!metrics.has_classes);
    }

    #[test]
    fn test_metrics_detects_patterns() {
        let code = "// entry\nimport fs from 'fs';\nclass Foo {}\nconst f = () => 1;";
        let metrics = CodeMetrics::analyze(code);

        assert!(metrics.has_comments);
        assert!(metrics.has_imports);
        assert!(metrics.has_classes);
        assert!(metrics.has_functions);
    }

    #[test]
    fn test_line_count_buckets() {
        let moderate = "let x = 1;\n".repeat(40);
        assert_eq!(
            CodeMetrics::analyze(&moderate).complexity,
            Complexity::Moderate
        );

        let complex = "let x = 1;\n".repeat(150);
        assert_eq!(
            CodeMetrics::analyze(&complex).complexity,
            Complexity::Complex
        );
    }

    #[test]
    fn test_nesting_buckets() {
        // 4 levels of nesting in few lines
        let code = "if (a) { if (b) { if (c) { if (d) { x(); } } } }";
        assert_eq!(CodeMetrics::analyze(code).complexity, Complexity::Moderate);

        let code = "{ { { { { { x } } } } } }";
        assert_eq!(CodeMetrics::analyze(code).complexity, Complexity::Complex);
    }

    #[test]
    fn test_unbalanced_brackets_do_not_underflow() {
        assert_eq!(max_nesting(")))((("), 3);
    }

    #[tokio::test]
    async fn test_mock_never_fails_and_is_deterministic() {
        let generator = MockGenerator::with_delay(Duration::ZERO);
        let code = "function add(a, b) { return a + b; }";

        let first = generator
            .generate(code, Language::Javascript, ReviewStyle::Detailed)
            .await
            .unwrap();
        let second = generator
            .generate(code, Language::Javascript, ReviewStyle::Detailed)
            .await
            .unwrap();

        assert_eq!(first.review, second.review);
        assert!(first.metadata.is_mock);
        assert!(first.metadata.metrics.is_some());
    }

    #[tokio::test]
    async fn test_template_placeholders_resolved() {
        let generator = MockGenerator::with_delay(Duration::ZERO);
        let result = generator
            .generate("let x = 1;", Language::Typescript, ReviewStyle::Concise)
            .await
            .unwrap();

        assert!(result.review.contains("typescript"));
        assert!(!result.review.contains("{language}"));
        assert!(!result.review.contains("{lineCount}"));
    }

    #[tokio::test]
    async fn test_missing_comment_addendum() {
        let generator = MockGenerator::with_delay(Duration::ZERO);

        let without_comments = generator
            .generate("let x = 1;", Language::Javascript, ReviewStyle::Concise)
            .await
            .unwrap();
        assert!(without_comments.review.contains("Missing Comments"));

        let with_comments = generator
            .generate("// init\nlet x = 1;", Language::Javascript, ReviewStyle::Concise)
            .await
            .unwrap();
        assert!(!with_comments.review.contains("Missing Comments"));
    }
}
