use bwbench::error::AppResult;

fn main() -> AppResult<()> {
    bwbench::entry::run()
}
