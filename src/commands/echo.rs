//! `echo [word...] [> file]`
//!
//! Without redirection the words are printed joined by single spaces. With
//! `> file` as the last two tokens the same text, without a trailing newline,
//! replaces the contents of `file`.

use crate::context::Context;
use anyhow::Context as _;

pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    match argv {
        [words @ .., ">", target] => {
            let path = context.resolve(target);
            context
                .fs
                .create_file(&path, words.join(" ").as_bytes())
                .context("write error")
        }
        words => {
            println!("{}", words.join(" "));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::installed_context;

    #[test]
    fn redirect_writes_joined_words() {
        let mut ctx = installed_context(0);
        ctx.set_cwd("/tmp".to_string());
        handle_argv(&["hello", "there", ">", "greeting"], &mut ctx).unwrap();
        assert_eq!(ctx.fs.read_to_vec("/tmp/greeting").unwrap(), b"hello there");

        handle_argv(&["bye", ">", "greeting"], &mut ctx).unwrap();
        assert_eq!(ctx.fs.read_to_vec("/tmp/greeting").unwrap(), b"bye");
    }

    #[test]
    fn bare_redirect_truncates() {
        let mut ctx = installed_context(0);
        handle_argv(&["x", ">", "/tmp/f"], &mut ctx).unwrap();
        handle_argv(&[">", "/tmp/f"], &mut ctx).unwrap();
        assert!(ctx.fs.read_to_vec("/tmp/f").unwrap().is_empty());
    }

    #[test]
    fn plain_echo_touches_nothing() {
        let mut ctx = installed_context(0);
        let before = ctx.fs.stats();
        handle_argv(&["a", ">b"], &mut ctx).unwrap();
        handle_argv(&[], &mut ctx).unwrap();
        assert_eq!(ctx.fs.stats(), before);
    }

    #[test]
    fn overlong_target_is_refused() {
        let mut ctx = installed_context(0);
        let deep = "d".repeat(26);
        let mut cwd = String::new();
        for _ in 0..9 {
            cwd.push('/');
            cwd.push_str(&deep);
        }
        ctx.fs.create_directory(&cwd).unwrap();
        ctx.set_cwd(cwd.clone());

        let before = ctx.fs.stats();
        let err = handle_argv(&["x", ">", &"f".repeat(20)], &mut ctx).unwrap_err();
        assert_eq!(format!("{err:#}"), "write error: invalid name");
        assert_eq!(ctx.fs.stats(), before);
        assert!(ctx.fs.list_directory(&cwd).unwrap().is_empty());
    }

    #[test]
    fn redirect_into_directory_fails() {
        let mut ctx = installed_context(0);
        let err = handle_argv(&["x", ">", "/home"], &mut ctx).unwrap_err();
        assert!(format!("{err:#}").starts_with("write error"));
    }
}
