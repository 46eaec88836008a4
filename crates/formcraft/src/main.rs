fn main() -> anyhow::Result<()> {
    formcraft::cli::main()
}
