use memvfs::{NodeKind, Vfs, VfsError};

pub fn main() -> Result<(), VfsError> {
    let mut vfs = Vfs::new(16, 32)?;

    vfs.mkdir("docs")?;
    vfs.cd("docs")?;
    vfs.create_file("hello.txt")?;
    vfs.write("hello.txt", b"hello from a block pool")?;

    println!("{}", vfs.pwd());
    for entry in vfs.ls() {
        let suffix = if entry.kind == NodeKind::Directory { "/" } else { "" };
        println!("  {}{}", entry.name, suffix);
    }
    println!(
        "{}",
        String::from_utf8_lossy(&vfs.read("hello.txt")?)
    );

    let usage = vfs.df();
    println!("{} of {} blocks used", usage.used, usage.total);
    Ok(())
}
