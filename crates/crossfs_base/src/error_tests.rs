/* 📖 # Why use a separate file for these error tests?

The span trace tests depend on the tracing subscriber and on the layout of the Debug
output. Keeping them out of the error module keeps that module's inline tests focused on
the plain value semantics.
*/

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::{CrossfsError, CrossfsResult, FilePath, ResultExt};
    use expect_test::expect;
    use std::error::Error;
    use std::io;
    use tracing::span;
    use tracing_error::ErrorLayer;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    // 📖 # Why set up a subscriber in the test?
    // SpanTrace::capture() requires an active tracing subscriber to record span information.
    // `try_init()` tolerates the subscriber already being installed by a concurrent test.
    fn setup_tracing_subscriber() {
        let _ = tracing_subscriber::registry()
            .with(ErrorLayer::default())
            .try_init();
    }

    fn io_failure(kind: io::ErrorKind, message: &str) -> io::Error {
        io::Error::new(kind, message.to_string())
    }

    #[test]
    fn test_error_context_attachment() {
        let error = CrossfsError::message("original error")
            .context("first context")
            .context("second context");

        assert_eq!(error.get_context().len(), 2);
        assert_eq!(error.get_context()[0], "first context");
        assert_eq!(error.get_context()[1], "second context");
    }

    #[test]
    fn test_error_with_context_lazy_evaluation() {
        let mut called = false;
        let error = CrossfsError::message("error").with_context(|| {
            called = true;
            "lazy context".to_string()
        });

        assert!(called);
        assert_eq!(error.get_context()[0], "lazy context");
    }

    #[test]
    fn test_display_copy_failure_names_both_paths() {
        let error = CrossfsError::new(ErrorKind::FileCopyFailed {
            from: FilePath::from("in.bin"),
            to: FilePath::from("out.bin"),
            source: io_failure(io::ErrorKind::StorageFull, "disk full"),
        });
        assert_eq!(error.to_string(), "Could not copy in.bin to out.bin: disk full");
    }

    #[test]
    fn test_display_directory_errors() {
        let create = CrossfsError::new(ErrorKind::DirectoryCreateFailed {
            path: FilePath::from("out"),
            source: io_failure(io::ErrorKind::PermissionDenied, "denied"),
        });
        assert_eq!(create.to_string(), "Could not create directory out: denied");

        let remove = CrossfsError::new(ErrorKind::DirectoryRemoveFailed {
            path: FilePath::from("out"),
            source: io_failure(io::ErrorKind::DirectoryNotEmpty, "not empty"),
        })
        .context("removing directory tree out");
        assert_eq!(
            remove.to_string(),
            "removing directory tree out: Could not remove directory out: not empty"
        );
    }

    #[test]
    fn test_result_ext_chaining() {
        let result: CrossfsResult<i32> = Err(Box::new(CrossfsError::message("root")));
        let err = result
            .context("step 1")
            .context("step 2")
            .with_context(|| "step 3".to_string())
            .unwrap_err();
        assert_eq!(err.to_string(), "step 1: step 2: step 3: root");
    }

    #[test]
    fn test_root_cause_through_cause_chain() {
        let inner = CrossfsError::new(ErrorKind::FileRemoveFailed {
            path: FilePath::from("a.txt"),
            source: io_failure(io::ErrorKind::PermissionDenied, "access denied"),
        });
        let outer = CrossfsError::message("cleanup failed").caused_by(inner);

        assert!(outer.cause().is_some());
        assert!(outer.source().is_some());
        assert_eq!(outer.root_cause().to_string(), "access denied");
    }

    #[test]
    fn test_debug_nested_errors() {
        let inner_error = CrossfsError::message("inner error").context("inner context");
        let outer_error = CrossfsError::message("outer error")
            .context("outer context")
            .caused_by(inner_error);

        expect![[r#"
            outer error
            ├─ outer context
            └─ cause: inner error
               └─ inner context

        "#]]
        .assert_debug_eq(&outer_error);
    }

    #[test]
    fn test_debug_without_context() {
        let error = CrossfsError::message("plain");
        expect![[r#"
            plain

        "#]]
        .assert_debug_eq(&error);
    }

    #[test]
    fn test_spantrace_includes_span_information() {
        setup_tracing_subscriber();

        let operation_span = span!(tracing::Level::DEBUG, "remove_tree", files = 3);
        let _guard = operation_span.enter();

        let error = CrossfsError::message("test error message").context("while cleaning up");
        let debug = format!("{:?}", error);

        assert!(debug.starts_with("test error message\n└─ while cleaning up\n"));
        assert!(debug.contains("Trace:"), "{debug}");
        assert!(debug.contains("remove_tree"), "{debug}");
        assert!(debug.contains("files=3"), "{debug}");
    }

    #[test]
    fn test_spantrace_is_captured_at_creation() {
        setup_tracing_subscriber();

        let error = {
            let span = span!(tracing::Level::INFO, "copy_fallback");
            let _guard = span.enter();
            CrossfsError::message("copy failed")
        };

        let later = span!(tracing::Level::INFO, "unrelated_later_span");
        let _guard = later.enter();
        let debug = format!("{:?}", error);
        assert!(debug.contains("copy_fallback"), "{debug}");
        assert!(!debug.contains("unrelated_later_span"), "{debug}");
    }
}
