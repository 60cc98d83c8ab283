use std::io::Write;

use rank_run::group::WorkerGroup;
use rank_run::scheduler::{assign, distribute, receive, Assignment, CommandList, CommandLoader};
use rank_run::RankRunError;

fn write_cmdfile(lines: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

#[tokio::test]
async fn test_load_skips_blank_and_comment_lines() {
    let file = write_cmdfile(&["cmd1", "# comment", "", "cmd2"]);
    let loader = CommandLoader::new(4, 4999);

    let list = loader.load(file.path()).await.unwrap();

    assert_eq!(list.commands(), &["cmd1".to_string(), "cmd2".to_string()]);
    assert_eq!(list.ignored(), 0);
}

#[tokio::test]
async fn test_load_trims_and_keeps_interior_whitespace() {
    let file = write_cmdfile(&["   echo  a   b  \t", "\t  # indented comment", "  \r"]);
    let loader = CommandLoader::new(4, 4999);

    let list = loader.load(file.path()).await.unwrap();

    assert_eq!(list.commands(), &["echo  a   b".to_string()]);
}

#[tokio::test]
async fn test_load_handles_crlf_and_missing_final_newline() {
    let loader = CommandLoader::new(4, 4999);
    let input: &[u8] = b"first\r\nsecond\r\nthird";

    let list = loader.read(input).await.unwrap();

    assert_eq!(
        list.commands(),
        &["first".to_string(), "second".to_string(), "third".to_string()]
    );
}

#[tokio::test]
async fn test_load_caps_at_group_size() {
    let file = write_cmdfile(&["c1", "c2", "# skip", "c3", "c4", "c5"]);
    let loader = CommandLoader::new(3, 4999);

    let list = loader.load(file.path()).await.unwrap();

    assert_eq!(list.len(), 3);
    assert_eq!(list.commands()[2], "c3");
    assert_eq!(list.ignored(), 2);
}

#[tokio::test]
async fn test_load_truncates_long_lines() {
    let long = "x".repeat(100);
    let file = write_cmdfile(&[&long, "short"]);
    let loader = CommandLoader::new(4, 10);

    let list = loader.load(file.path()).await.unwrap();

    // The rest of an over-long line never becomes a command of its own
    assert_eq!(list.commands(), &["x".repeat(10), "short".to_string()]);
}

#[tokio::test]
async fn test_load_tolerates_invalid_utf8() {
    let loader = CommandLoader::new(2, 4999);
    let input: &[u8] = b"echo \xff\nls\n";

    let list = loader.read(input).await.unwrap();

    assert_eq!(list.len(), 2);
    assert_eq!(list.commands()[1], "ls");
}

#[tokio::test]
async fn test_load_empty_file() {
    let file = write_cmdfile(&[]);
    let loader = CommandLoader::new(2, 4999);

    let list = loader.load(file.path()).await.unwrap();

    assert!(list.is_empty());
}

#[tokio::test]
async fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let loader = CommandLoader::new(2, 4999);

    let err = loader
        .load(dir.path().join("no_such_cmdfile"))
        .await
        .unwrap_err();

    assert!(matches!(err, RankRunError::CommandFile { .. }));
    assert!(err.to_string().contains("no_such_cmdfile"));
}

#[test]
fn test_assign_by_position() {
    let list = CommandList::new(vec!["cmd1".to_string(), "cmd2".to_string()]);

    let assignments = assign(list, 4);

    assert_eq!(
        assignments,
        vec![
            Assignment::new(0, "cmd1".to_string()),
            Assignment::new(1, "cmd2".to_string()),
            Assignment::new(2, String::new()),
            Assignment::new(3, String::new()),
        ]
    );
    assert!(!assignments[1].is_idle());
    assert!(assignments[2].is_idle());
}

#[test]
fn test_assign_drops_excess_commands() {
    let commands = (1..=5).map(|i| format!("cmd{}", i)).collect();

    let assignments = assign(CommandList::new(commands), 3);

    assert_eq!(assignments.len(), 3);
    let assigned: Vec<&str> = assignments.iter().map(|a| a.command.as_str()).collect();
    assert_eq!(assigned, vec!["cmd1", "cmd2", "cmd3"]);
}

#[tokio::test]
async fn test_distribute_sends_one_message_per_worker() {
    let group = WorkerGroup::new(4, 4999).unwrap();
    let outcome = group
        .run(|mut comm| async move {
            let assignment = if comm.is_coordinator() {
                let list = CommandList::new(vec!["a".to_string(), "b".to_string()]);
                distribute(&comm, list).await?
            } else {
                receive(&mut comm).await?
            };

            let expected = match comm.rank() {
                0 => "a",
                1 => "b",
                _ => "",
            };
            assert_eq!(assignment.worker_id, comm.rank());
            assert_eq!(assignment.command, expected);
            Ok::<(), RankRunError>(())
        })
        .await;

    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_distribute_with_empty_list_unblocks_everyone() {
    let group = WorkerGroup::new(3, 4999).unwrap();
    let outcome = group
        .run(|mut comm| async move {
            let assignment = if comm.is_coordinator() {
                distribute(&comm, CommandList::default()).await?
            } else {
                receive(&mut comm).await?
            };
            assert!(assignment.is_idle());
            Ok::<(), RankRunError>(())
        })
        .await;

    assert_eq!(outcome.exit_code, 0);
}
