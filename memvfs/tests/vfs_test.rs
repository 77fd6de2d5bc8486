use memvfs::{Entry, NodeKind, Vfs, VfsBuilder, VfsError};

fn entry(name: &str, kind: NodeKind) -> Entry {
    Entry {
        name: name.to_string(),
        kind,
    }
}

#[test]
fn file_lifecycle_on_small_disk() {
    let mut vfs = Vfs::new(4, 8).unwrap();
    assert_eq!(vfs.df().free, 4);

    vfs.create_file("a").unwrap();
    vfs.write("a", b"1234567890123").unwrap();
    assert_eq!(vfs.df().free, 2);
    assert_eq!(vfs.read("a").unwrap(), b"1234567890123");

    vfs.delete("a").unwrap();
    assert_eq!(vfs.df().free, 4);
}

#[test]
fn write_needing_more_than_remaining_blocks_keeps_free_count() {
    let mut vfs = Vfs::new(4, 8).unwrap();
    vfs.create_file("filler").unwrap();
    vfs.create_file("b").unwrap();
    // 17 encoded bytes, three blocks.
    vfs.write("filler", b"0123456789abcdef").unwrap();
    assert_eq!(vfs.df().free, 1);

    assert_eq!(vfs.write("b", b"two blocks"), Err(VfsError::DiskFull));
    assert_eq!(vfs.df().free, 1);

    // The remaining block still satisfies a small write.
    vfs.write("b", b"fits").unwrap();
    assert_eq!(vfs.df().free, 0);
    assert_eq!(vfs.read("b").unwrap(), b"fits");
}

#[test]
fn listing_preserves_creation_order_across_kinds() {
    let mut vfs = Vfs::default();
    vfs.mkdir("A").unwrap();
    vfs.create_file("B").unwrap();
    vfs.mkdir("C").unwrap();

    assert_eq!(
        vfs.ls(),
        vec![
            entry("A", NodeKind::Directory),
            entry("B", NodeKind::File),
            entry("C", NodeKind::Directory),
        ]
    );

    vfs.delete("B").unwrap();
    vfs.create_file("B").unwrap();
    let names: Vec<String> = vfs.ls().into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["A", "C", "B"]);
}

#[test]
fn empty_directory_lists_nothing() {
    let mut vfs = Vfs::default();
    vfs.mkdir("empty").unwrap();
    vfs.cd("empty").unwrap();

    assert!(vfs.ls().is_empty());
    assert_eq!(vfs.pwd(), "/empty");
}

#[test]
fn names_are_validated_and_unique() {
    let mut vfs = Vfs::default();
    vfs.mkdir("docs").unwrap();

    assert_eq!(
        vfs.create_file("docs"),
        Err(VfsError::DuplicateName("docs".to_string()))
    );
    assert_eq!(vfs.mkdir(""), Err(VfsError::InvalidName(String::new())));
    assert!(matches!(vfs.mkdir("a/b"), Err(VfsError::InvalidName(_))));
    assert!(matches!(
        vfs.create_file(&"x".repeat(50)),
        Err(VfsError::InvalidName(_))
    ));
    vfs.create_file(&"x".repeat(49)).unwrap();
}

#[test]
fn rmdir_on_populated_directory_changes_nothing() {
    let mut vfs = Vfs::new(8, 16).unwrap();
    vfs.mkdir("outer").unwrap();
    vfs.cd("outer").unwrap();
    vfs.mkdir("inner").unwrap();
    vfs.create_file("f").unwrap();
    vfs.write("f", b"payload").unwrap();
    vfs.cd("..").unwrap();
    let usage = vfs.df();

    assert_eq!(
        vfs.rmdir("outer"),
        Err(VfsError::NotEmpty("outer".to_string()))
    );

    assert_eq!(vfs.df(), usage);
    vfs.cd("outer").unwrap();
    assert_eq!(vfs.ls().len(), 2);
    assert_eq!(vfs.read("f").unwrap(), b"payload");
}

#[test]
fn cd_up_at_root_is_a_no_op() {
    let mut vfs = Vfs::default();

    vfs.cd("..").unwrap();
    vfs.cd("..").unwrap();

    assert_eq!(vfs.pwd(), "/");
    assert!(vfs.is_root());
}

#[test]
fn large_payload_round_trips_across_many_blocks() {
    let mut vfs = VfsBuilder::new()
        .with_total_blocks(64)
        .with_block_size(16)
        .build()
        .unwrap();
    let data: Vec<u8> = (0..1000).map(|i| b'a' + (i % 26) as u8).collect();
    vfs.create_file("big").unwrap();

    vfs.write("big", &data).unwrap();

    assert_eq!(vfs.block_count("big").unwrap(), 63);
    assert_eq!(vfs.file_size("big").unwrap(), 1000);
    assert_eq!(vfs.read("big").unwrap(), data);
    let usage = vfs.df();
    assert_eq!(usage.used + usage.free, usage.total);
}

#[test]
fn teardown_returns_all_blocks() {
    let mut vfs = Vfs::new(16, 8).unwrap();
    for dir in &["a", "b"] {
        vfs.mkdir(dir).unwrap();
        vfs.cd(dir).unwrap();
        vfs.create_file("f").unwrap();
        vfs.write("f", b"some text").unwrap();
    }

    let report = vfs.teardown();

    assert_eq!(report.nodes, 5);
    assert_eq!(report.blocks, 4);
}
