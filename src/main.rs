fn main() -> Result<(), Box<dyn std::error::Error>> {
    chatstream::cli::main()
}
