use crate::context::Context;
use crate::fs::consts::BLOCK_SIZE;

pub fn handle_argv(_argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    let stats = context.fs.stats();
    let used_blocks = stats.total_blocks - stats.free_blocks;
    let used_inodes = stats.total_inodes - stats.free_inodes;

    println!("File system size: {} B", stats.total_blocks as usize * BLOCK_SIZE);
    println!("Block size: {BLOCK_SIZE} B");
    println!(
        "Data blocks: all={} used={} free={}",
        stats.total_blocks, used_blocks, stats.free_blocks
    );
    println!(
        "I-nodes: all={} used={} free={}",
        stats.total_inodes, used_inodes, stats.free_inodes
    );
    println!("Directories: {}", stats.directories);
    println!("Files: {}", stats.files);
    Ok(())
}
