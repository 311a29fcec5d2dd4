use anyhow::Result;

use crate::application::LedgerService;
use crate::domain::format_cents;

use super::print_accounts;

/// Open two accounts, move 50.00 from the first to the second and show the
/// ledger before and after. A failed transfer is reported, not fatal.
pub async fn run(service: &LedgerService) -> Result<()> {
    let alice = service
        .create_account("Alice", "alice@mail.com", 10000)
        .await?;
    let bob = service.create_account("Bob", "bob@mail.com", 20000).await?;

    println!("All accounts before transfer:");
    print_accounts(&service.list_accounts().await?);

    println!("\nAccount {}:", alice.id);
    match service.get_account(alice.id).await {
        Ok(account) => println!(
            "  {} <{}> balance {}",
            account.name,
            account.email,
            format_cents(account.balance)
        ),
        Err(err) => println!("  lookup failed: {}", err),
    }

    println!(
        "\nTransferring 50.00 from {} ({}) to {} ({})...",
        alice.name, alice.id, bob.name, bob.id
    );
    match service.transfer(alice.id, bob.id, 5000).await {
        Ok(receipt) => println!("Transfer #{} committed.", receipt.id),
        Err(err) => println!("Transfer failed: {}", err),
    }

    println!("\nAll accounts after transfer:");
    print_accounts(&service.list_accounts().await?);

    Ok(())
}
